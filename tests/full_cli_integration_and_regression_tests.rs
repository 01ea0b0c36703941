use std::path::{Path, PathBuf};

use chaos_renderer::{
    cli::render::{read_simulation_params, render_simulation},
    core::file_io::FilePrefix,
};

fn render_param_file(params_name: &str, test_name: &str) -> PathBuf {
    let params =
        read_simulation_params(&format!("tests/param_files/{}.json", params_name)).unwrap();
    let directory_path: PathBuf = ["out", "integration_tests", test_name].iter().collect();
    render_simulation(
        &params,
        FilePrefix {
            directory_path: directory_path.clone(),
            file_base: String::from("result"),
        },
    )
    .unwrap();
    directory_path.join(params.name())
}

fn assert_files_exist(directory: &Path, suffixes: &[&str]) {
    for suffix in suffixes {
        let path = directory.join(format!("result{}", suffix));
        assert!(path.exists(), "missing output file: {}", path.display());
    }
}

fn count_gif_frames(path: &Path) -> usize {
    use image::{codecs::gif::GifDecoder, AnimationDecoder};
    let file = std::io::BufReader::new(std::fs::File::open(path).unwrap());
    GifDecoder::new(file).unwrap().into_frames().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mandelbrot_render() {
        let directory = render_param_file("mandelbrot_tiny", "mandelbrot_render");
        assert_files_exist(&directory, &[".json", ".png", "_diagnostics.txt"]);
        let dimensions = image::image_dimensions(directory.join("result.png")).unwrap();
        assert_eq!(dimensions, (60, 40));
    }

    #[test]
    fn test_lorenz_attractor_render() {
        let directory = render_param_file("lorenz_attractor_tiny", "lorenz_attractor_render");
        assert_files_exist(
            &directory,
            &[".json", ".png", "_rotation.gif", "_diagnostics.txt"],
        );
        let dimensions = image::image_dimensions(directory.join("result.png")).unwrap();
        assert_eq!(dimensions, (64, 64));
        assert_eq!(count_gif_frames(&directory.join("result_rotation.gif")), 4);

        let diagnostics =
            std::fs::read_to_string(directory.join("result_diagnostics.txt")).unwrap();
        assert!(diagnostics.contains("trajectory point count: 200"));
    }

    #[test]
    fn test_double_pendulum_render() {
        let directory = render_param_file("double_pendulum_tiny", "double_pendulum_render");
        assert_files_exist(&directory, &[".json", ".gif", "_diagnostics.txt"]);
        let dimensions = image::image_dimensions(directory.join("result.gif")).unwrap();
        assert_eq!(dimensions, (48, 48));
        assert_eq!(count_gif_frames(&directory.join("result.gif")), 12);

        let diagnostics =
            std::fs::read_to_string(directory.join("result_diagnostics.txt")).unwrap();
        assert!(diagnostics.contains("reference energy"));
        assert!(diagnostics.contains("final separation"));
    }

    #[test]
    fn test_echoed_parameters_can_be_read_back() {
        let directory = render_param_file("mandelbrot_tiny", "echoed_parameters");
        let original = read_simulation_params("tests/param_files/mandelbrot_tiny.json").unwrap();
        let echoed =
            read_simulation_params(directory.join("result.json").to_str().unwrap()).unwrap();
        assert_eq!(
            serde_json::to_value(&echoed).unwrap(),
            serde_json::to_value(&original).unwrap()
        );
    }
}
