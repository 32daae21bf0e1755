//! Tests for CSV export of PSD and REV tables

#[cfg(test)]
mod tests {
    use porerev::analysis::pipeline::{ResultSink, ScaleResult};
    use porerev::analysis::rev::{RevPoint, RevTrace};
    use porerev::io::configuration::OutputOptions;
    use porerev::io::export::{CsvExporter, psd_path, rev_path, write_psd, write_rev};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn scale_result(fraction: f64, psd: Vec<f64>) -> ScaleResult {
        ScaleResult {
            fraction,
            edge: 10,
            point: RevPoint {
                volume_mm3: 1e-6,
                porosity: 0.2,
            },
            pore_count: psd.len(),
            psd,
            summary: None,
        }
    }

    fn trace() -> RevTrace {
        let mut trace = RevTrace::new(RevPoint {
            volume_mm3: 8e-6,
            porosity: 0.25,
        });
        trace
            .record(10, &[porerev::segment::PoreRegion::new(200)], 1.0)
            .unwrap();
        trace
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .unwrap();
        reader
            .records()
            .map(|record| record.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    // Tests table names carry the stem, suffix and scale
    // Verified by dropping the scale from the PSD name
    #[test]
    fn test_table_paths() {
        let dir = Path::new("out");
        assert_eq!(
            psd_path(dir, "berea", 25.0),
            Path::new("out/berea_psd_25.csv")
        );
        assert_eq!(
            psd_path(dir, "berea", 12.5),
            Path::new("out/berea_psd_12.5.csv")
        );
        assert_eq!(rev_path(dir, "berea"), Path::new("out/berea_rev.csv"));
    }

    // Tests the PSD table has a header and one radius per row in order
    // Verified by sorting radii before writing
    #[test]
    fn test_write_psd() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scan_psd_50.csv");
        write_psd(&path, &[2.5, 1.0, 4.0]).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows, vec![vec!["radius_um"], vec!["2.5"], vec!["1.0"], vec!["4.0"]]);
    }

    // Tests an empty PSD still produces a header-only table
    // Verified by skipping files with no radii
    #[test]
    fn test_write_empty_psd() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty_psd_50.csv");
        write_psd(&path, &[]).unwrap();
        assert_eq!(read_rows(&path), vec![vec!["radius_um"]]);
    }

    // Tests the REV table lists the whole image first
    // Verified by writing points in reverse
    #[test]
    fn test_write_rev() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("scan_rev.csv");
        write_rev(&path, &trace()).unwrap();

        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows.first(), Some(&vec!["volume_mm3".to_string(), "porosity".to_string()]));
        let porosities: Vec<f64> = rows
            .iter()
            .skip(1)
            .filter_map(|row| row.get(1).and_then(|value| value.parse().ok()))
            .collect();
        assert_eq!(porosities.len(), 2);
        assert!(porosities.first().is_some_and(|p| (p - 0.25).abs() < 1e-12));
        assert!(porosities.last().is_some_and(|p| (p - 0.2).abs() < 1e-12));
    }

    // Tests the exporter writes one PSD per scale and one REV table
    // Verified by overwriting a single PSD file for every scale
    #[test]
    fn test_exporter_writes_tables() {
        let temp_dir = TempDir::new().unwrap();
        let mut exporter = CsvExporter::new(temp_dir.path(), "scan", OutputOptions::default());

        exporter
            .scale_completed(&scale_result(50.0, vec![1.0, 2.0]))
            .unwrap();
        exporter
            .scale_completed(&scale_result(100.0, vec![3.0]))
            .unwrap();
        exporter.trace_completed(&trace()).unwrap();

        assert_eq!(
            exporter.written(),
            &[
                temp_dir.path().join("scan_psd_50.csv"),
                temp_dir.path().join("scan_psd_100.csv"),
                temp_dir.path().join("scan_rev.csv"),
            ]
        );
        assert!(exporter.written().iter().all(|path| path.exists()));
    }

    // Tests disabled outputs are not written
    // Verified by ignoring the persistence flags
    #[test]
    fn test_exporter_respects_options() {
        let temp_dir = TempDir::new().unwrap();
        let options = OutputOptions {
            save_psd: false,
            save_rev: false,
            retain_psd: true,
        };
        let mut exporter = CsvExporter::new(temp_dir.path(), "scan", options);

        exporter
            .scale_completed(&scale_result(50.0, vec![1.0]))
            .unwrap();
        exporter.trace_completed(&trace()).unwrap();

        assert!(exporter.written().is_empty());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    // Tests write failures surface as errors
    // Verified by swallowing CSV errors
    #[test]
    fn test_write_into_file_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let result = write_psd(&blocker.join("scan_psd_50.csv"), &[1.0]);
        assert!(result.is_err());
    }
}
