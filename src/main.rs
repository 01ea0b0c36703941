use chaos_renderer::{
    cli::{
        args::{ChaosRendererArgs, CommandsEnum},
        render::{default_simulation_params, read_simulation_params, render_simulation},
    },
    core::file_io::{
        build_output_path_with_date_time, extract_base_name, maybe_date_time_string, FilePrefix,
    },
};
use clap::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: ChaosRendererArgs = ChaosRendererArgs::parse();

    match &args.command {
        Some(CommandsEnum::Render(params)) => {
            let simulation_params = read_simulation_params(&params.params_path)?;
            let base_name = extract_base_name(&params.params_path)
                .ok_or_else(|| format!("Invalid parameter path: `{}`", params.params_path))?;
            let file_prefix = FilePrefix {
                directory_path: build_output_path_with_date_time(
                    base_name,
                    "render",
                    &maybe_date_time_string(params.date_time_out),
                )?,
                file_base: "result".to_owned(),
            };
            render_simulation(&simulation_params, file_prefix)
        }

        Some(CommandsEnum::Demo(selection)) => {
            let file_prefix = FilePrefix {
                directory_path: ["out", "demo"].iter().collect(),
                file_base: "result".to_owned(),
            };
            render_simulation(&default_simulation_params(selection.simulation), file_prefix)
        }

        None => {
            println!("Default command (nothing specified!)  Try `render <params.json>` or `demo <simulation>`.");
            Ok(())
        }
    }
}
