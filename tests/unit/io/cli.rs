//! Tests for command-line interface parsing and run orchestration

#[cfg(test)]
mod tests {
    use clap::Parser;
    use porerev::AnalysisError;
    use porerev::io::cli::{AnalysisRunner, Cli};
    use porerev::io::configuration::{
        DEFAULT_CONNECTIVITY, DEFAULT_RESOLUTION_UM, DEFAULT_SCALES, DEFAULT_SEED, RunMode,
    };
    use porerev::segment::engine::SegmenterKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    // Tests CLI parsing with only the required target argument
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_cli_parse_minimal_args() {
        let cli = Cli::parse_from(vec!["program", "scan.tif"]);

        assert_eq!(cli.target, Some(PathBuf::from("scan.tif")));
        assert!((cli.resolution - DEFAULT_RESOLUTION_UM).abs() < f64::EPSILON);
        assert_eq!(cli.scales, DEFAULT_SCALES.to_vec());
        assert_eq!(cli.engine, SegmenterKind::Watershed);
        assert_eq!(cli.connectivity, DEFAULT_CONNECTIVITY);
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert!(!cli.quiet);
        assert!(!cli.first_scale);
    }

    // Tests CLI parsing with all available arguments
    // Verified by modifying the scale delimiter
    #[test]
    fn test_cli_parse_all_args() {
        let cli = Cli::parse_from(vec![
            "program",
            "data/berea.tif",
            "--resolution",
            "2.5",
            "--scales",
            "10,20,40",
            "--output-dir",
            "results",
            "--first-scale",
            "--engine",
            "components",
            "--connectivity",
            "6",
            "--min-peak-distance",
            "3",
            "--no-psd",
            "--no-rev",
            "--quiet",
        ]);

        assert!((cli.resolution - 2.5).abs() < f64::EPSILON);
        assert_eq!(cli.scales, vec![10.0, 20.0, 40.0]);
        assert_eq!(cli.output_dir, Some(PathBuf::from("results")));
        assert!(cli.first_scale);
        assert_eq!(cli.engine, SegmenterKind::Components);
        assert_eq!(cli.connectivity, 6);
        assert_eq!(cli.min_peak_distance, 3);
        assert!(cli.no_psd);
        assert!(cli.no_rev);
        assert!(cli.quiet);
    }

    // Tests short flags map to the same options
    // Verified by removing a short flag
    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(vec![
            "program", "scan.tif", "-r", "4", "-s", "50", "-o", "out", "-e", "watershed", "-c",
            "18", "-q", "-vv",
        ]);

        assert!((cli.resolution - 4.0).abs() < f64::EPSILON);
        assert_eq!(cli.scales, vec![50.0]);
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.connectivity, 18);
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_verbosity(), 4);
    }

    // Tests progress display based on --quiet flag
    // Verified by inverting quiet flag logic
    #[test]
    fn test_should_show_progress() {
        assert!(Cli::parse_from(vec!["program", "scan.tif"]).should_show_progress());
        assert!(!Cli::parse_from(vec!["program", "scan.tif", "-q"]).should_show_progress());
    }

    // Tests a target or a synthetic edge is required but not both
    // Verified by removing the argument conflict
    #[test]
    fn test_target_requirements() {
        assert!(Cli::try_parse_from(vec!["program"]).is_err());
        assert!(Cli::try_parse_from(vec!["program", "--synthetic", "16"]).is_ok());
        assert!(Cli::try_parse_from(vec!["program", "scan.tif", "--synthetic", "16"]).is_err());
    }

    // Tests generator options are rejected without a synthetic volume
    // Verified by dropping the synthetic requirement from the seed flag
    #[test]
    fn test_generator_options_require_synthetic() {
        assert!(Cli::try_parse_from(vec!["program", "scan.tif", "--seed", "3"]).is_err());
        assert!(Cli::try_parse_from(vec!["program", "scan.tif", "--porosity", "0.3"]).is_err());
        assert!(
            Cli::try_parse_from(vec!["program", "--synthetic", "8", "--seed", "3"]).is_ok()
        );
    }

    // Tests the run configuration splits the target into directory and filename
    // Verified by keeping the full path as the filename
    #[test]
    fn test_to_run_config() {
        let cli = Cli::parse_from(vec!["program", "data/berea.tif", "--first-scale", "--no-rev"]);
        let config = cli.to_run_config().unwrap();

        assert_eq!(config.input_dir, PathBuf::from("data"));
        assert_eq!(config.filename, "berea.tif");
        assert_eq!(config.output_dir, PathBuf::from("data"));
        assert_eq!(config.output_stem(), "berea");
        assert_eq!(config.mode, RunMode::FirstScale);
        assert!(config.output.save_psd);
        assert!(!config.output.save_rev);
    }

    // Tests a bare filename reads from the working directory
    // Verified by using an empty input directory
    #[test]
    fn test_bare_filename_uses_working_directory() {
        let cli = Cli::parse_from(vec!["program", "berea.tif", "-o", "out"]);
        let config = cli.to_run_config().unwrap();
        assert_eq!(config.input_dir, PathBuf::from("."));
        assert_eq!(config.output_dir, PathBuf::from("out"));
    }

    // Tests invalid resolution is rejected before any loading
    // Verified by skipping configuration validation
    #[test]
    fn test_invalid_resolution_rejected() {
        let cli = Cli::parse_from(vec!["program", "scan.tif", "-r", "0"]);
        assert!(matches!(
            cli.to_run_config(),
            Err(AnalysisError::InvalidParameter { .. })
        ));
    }

    // Tests synthetic options are carried into the generator configuration
    // Verified by ignoring the seed argument
    #[test]
    fn test_synthetic_config() {
        let cli = Cli::parse_from(vec![
            "program",
            "--synthetic",
            "24",
            "--porosity",
            "0.4",
            "--seed",
            "9",
        ]);
        let synthetic = cli.synthetic_config().unwrap();
        assert_eq!(synthetic.edge, 24);
        assert!((synthetic.porosity - 0.4).abs() < f64::EPSILON);
        assert_eq!(synthetic.seed, 9);

        let config = cli.to_run_config().unwrap();
        assert_eq!(config.output_stem(), "synthetic");
        assert!(Cli::parse_from(vec!["program", "scan.tif"]).synthetic_config().is_none());
    }

    // Tests a synthetic run writes its tables into the output directory
    // Verified by writing tables beside the input instead
    #[test]
    fn test_runner_synthetic_run() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().to_string_lossy().to_string();
        let cli = Cli::parse_from(vec![
            "program",
            "--synthetic",
            "16",
            "--scales",
            "50,100",
            "-o",
            &output,
            "-q",
        ]);

        let report = AnalysisRunner::new(cli).run().unwrap();
        assert_eq!(report.scales.len(), 2);
        assert_eq!(report.trace.len(), 3);
        assert!(temp_dir.path().join("synthetic_psd_50.csv").exists());
        assert!(temp_dir.path().join("synthetic_psd_100.csv").exists());
        assert!(temp_dir.path().join("synthetic_rev.csv").exists());
    }

    // Tests a missing input surfaces an error
    // Verified by treating missing files as empty volumes
    #[test]
    fn test_runner_missing_input() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.png");
        let cli = Cli::parse_from(vec!["program", missing.to_str().unwrap(), "-q"]);
        assert!(AnalysisRunner::new(cli).run().is_err());
    }
}
