use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[clap(author, version, about)]
pub struct ChaosRendererArgs {
    #[command(subcommand)]
    pub command: Option<CommandsEnum>,
}

#[derive(Debug, Subcommand)]
pub enum CommandsEnum {
    /// Render a simulation described by a JSON parameter file.
    Render(ParameterFilePath),
    /// Render a simulation using its built-in default parameters.
    Demo(DemoSelection),
}

#[derive(Debug, Args)]
pub struct ParameterFilePath {
    pub params_path: String,

    #[clap(long, short)]
    pub date_time_out: bool,
}

#[derive(Debug, Args)]
pub struct DemoSelection {
    #[arg(value_enum)]
    pub simulation: SimulationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SimulationKind {
    DoublePendulum,
    LorenzAttractor,
    Mandelbrot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render_command() {
        let args =
            ChaosRendererArgs::parse_from(["chaos-renderer", "render", "params.json", "-d"]);
        match args.command {
            Some(CommandsEnum::Render(params)) => {
                assert_eq!(params.params_path, "params.json");
                assert!(params.date_time_out);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_demo_command() {
        let args = ChaosRendererArgs::parse_from(["chaos-renderer", "demo", "lorenz-attractor"]);
        match args.command {
            Some(CommandsEnum::Demo(selection)) => {
                assert_eq!(selection.simulation, SimulationKind::LorenzAttractor);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_no_command() {
        let args = ChaosRendererArgs::parse_from(["chaos-renderer"]);
        assert!(args.command.is_none());
    }
}
