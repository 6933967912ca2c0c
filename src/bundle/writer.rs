use crate::error::{is_recoverable_read_error, Result, TreecatError};
use crate::scanner::SourceFile;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct BundleProgress {
    pub records_written: usize,
    pub total_files: usize,
    pub bytes_written: u64,
    pub current_file: Option<String>,
    pub start_time: Instant,
    /// One entry per file that degraded to an inline error marker.
    pub unreadable: Vec<String>,
}

impl BundleProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            records_written: 0,
            total_files,
            bytes_written: 0,
            current_file: None,
            start_time: Instant::now(),
            unreadable: Vec::new(),
        }
    }

    pub fn update_file(&mut self, filename: String, bytes: u64) {
        self.records_written += 1;
        self.bytes_written += bytes;
        self.current_file = Some(filename);
    }

    pub fn add_unreadable<S: Into<String>>(&mut self, description: S) {
        self.unreadable.push(description.into());
    }

    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.records_written as f64 / self.total_files as f64) * 100.0
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Owns the output file for the duration of one run. The file is created (or
/// truncated) up front so it exists even when the walk later fails; the
/// buffered writer is flushed on drop.
#[derive(Debug)]
pub struct BundleWriter {
    writer: BufWriter<fs::File>,
    output_path: PathBuf,
}

impl BundleWriter {
    pub fn create<P: AsRef<Path>>(output: P) -> Result<Self> {
        let output_path = output.as_ref().to_path_buf();

        let file = fs::File::create(&output_path).map_err(|e| TreecatError::OutputUnwritable {
            path: output_path.display().to_string(),
            source: e,
        })?;

        Ok(Self {
            writer: BufWriter::new(file),
            output_path,
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write one record per source file, in order. Unreadable or non-UTF-8
    /// files get an inline marker; the run keeps going. `cancel_check` runs
    /// between records so a requested stop takes effect mid-phase; records
    /// already written stay in the output.
    pub fn write_records(
        &mut self,
        files: &[SourceFile],
        progress_callback: Option<&dyn Fn(&BundleProgress)>,
        cancel_check: Option<&dyn Fn() -> Result<()>>,
    ) -> Result<BundleProgress> {
        let mut progress = BundleProgress::new(files.len());

        for file in files {
            if let Some(check) = cancel_check {
                check()?;
            }
            if let Some(callback) = progress_callback {
                callback(&progress);
            }

            let bytes = self.write_record(file, &mut progress)?;
            progress.update_file(file.filename.clone(), bytes);
        }

        if let Some(callback) = progress_callback {
            callback(&progress);
        }

        self.writer.flush()?;

        Ok(progress)
    }

    fn write_record(&mut self, file: &SourceFile, progress: &mut BundleProgress) -> Result<u64> {
        // Header goes out before the read attempt, exactly like the body of
        // a failed read does: every visited file leaves a record.
        writeln!(self.writer, "===== {} =====", file.display_path())?;

        match fs::read_to_string(&file.path) {
            Ok(content) => {
                self.writer.write_all(content.as_bytes())?;
                self.writer.write_all(b"\n\n")?;
                Ok(content.len() as u64)
            }
            Err(e) if is_recoverable_read_error(&e) => {
                writeln!(self.writer, "[Could not read file: {}]", e)?;
                self.writer.write_all(b"\n")?;
                progress.add_unreadable(format!("{}: {}", file.display_path(), e));
                Ok(0)
            }
            Err(e) => Err(TreecatError::Io(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn source_file(dir: &Path, name: &str, content: &[u8]) -> SourceFile {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        SourceFile::new(path, PathBuf::from(name), content.len() as u64)
    }

    #[test]
    fn test_record_format() {
        let temp_dir = TempDir::new().unwrap();
        let file = source_file(temp_dir.path(), "a.txt", b"hello");
        let output = temp_dir.path().join("out.txt");

        let mut writer = BundleWriter::create(&output).unwrap();
        let progress = writer.write_records(&[file.clone()], None, None).unwrap();
        drop(writer);

        assert_eq!(progress.records_written, 1);
        assert!(progress.unreadable.is_empty());

        let bundle = fs::read_to_string(&output).unwrap();
        let expected = format!("===== {} =====\nhello\n\n", file.display_path());
        assert_eq!(bundle, expected);
    }

    #[test]
    fn test_content_fidelity_with_trailing_newline() {
        let temp_dir = TempDir::new().unwrap();
        let file = source_file(temp_dir.path(), "a.txt", b"line one\nline two\n");
        let output = temp_dir.path().join("out.txt");

        let mut writer = BundleWriter::create(&output).unwrap();
        writer.write_records(&[file.clone()], None, None).unwrap();
        drop(writer);

        // Body is the content byte-for-byte plus exactly two newlines.
        let bundle = fs::read_to_string(&output).unwrap();
        let expected = format!("===== {} =====\nline one\nline two\n\n\n", file.display_path());
        assert_eq!(bundle, expected);
    }

    #[test]
    fn test_non_utf8_file_becomes_inline_marker() {
        let temp_dir = TempDir::new().unwrap();
        let good = source_file(temp_dir.path(), "good.txt", b"fine");
        let bad = source_file(temp_dir.path(), "bad.bin", &[0xff, 0xfe, 0x00, 0x80]);
        let output = temp_dir.path().join("out.txt");

        let mut writer = BundleWriter::create(&output).unwrap();
        let progress = writer.write_records(&[bad.clone(), good], None, None).unwrap();
        drop(writer);

        assert_eq!(progress.records_written, 2);
        assert_eq!(progress.unreadable.len(), 1);
        assert!(progress.unreadable[0].contains("bad.bin"));

        let bundle = fs::read_to_string(&output).unwrap();
        assert!(bundle.contains(&format!("===== {} =====", bad.display_path())));
        assert!(bundle.contains("[Could not read file:"));
        assert!(bundle.contains("fine"));
    }

    #[test]
    fn test_file_vanished_mid_walk_becomes_marker() {
        let temp_dir = TempDir::new().unwrap();
        let ghost = source_file(temp_dir.path(), "ghost.txt", b"soon gone");
        fs::remove_file(&ghost.path).unwrap();
        let output = temp_dir.path().join("out.txt");

        let mut writer = BundleWriter::create(&output).unwrap();
        let progress = writer.write_records(&[ghost], None, None).unwrap();
        drop(writer);

        assert_eq!(progress.records_written, 1);
        assert_eq!(progress.unreadable.len(), 1);

        let bundle = fs::read_to_string(&output).unwrap();
        assert!(bundle.contains("[Could not read file:"));
    }

    #[test]
    fn test_fault_isolation_keeps_record_count() {
        let temp_dir = TempDir::new().unwrap();
        let a = source_file(temp_dir.path(), "a.txt", b"alpha");
        let b = source_file(temp_dir.path(), "b.bin", &[0x80, 0x81]);
        let c = source_file(temp_dir.path(), "c.txt", b"gamma");
        let output = temp_dir.path().join("out.txt");

        let mut writer = BundleWriter::create(&output).unwrap();
        let progress = writer.write_records(&[a, b, c], None, None).unwrap();
        drop(writer);

        assert_eq!(progress.records_written, 3);
        assert_eq!(progress.unreadable.len(), 1);

        let bundle = fs::read_to_string(&output).unwrap();
        assert_eq!(bundle.matches("===== ").count(), 3);
    }

    #[test]
    fn test_output_is_truncated_on_create() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");
        fs::write(&output, "stale content from a previous run").unwrap();

        let writer = BundleWriter::create(&output).unwrap();
        drop(writer);

        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn test_unwritable_output_is_fatal() {
        let result = BundleWriter::create("/definitely/missing/dir/out.txt");
        assert!(matches!(
            result.unwrap_err(),
            TreecatError::OutputUnwritable { .. }
        ));
    }

    #[test]
    fn test_progress_tracking() {
        let mut progress = BundleProgress::new(10);

        assert_eq!(progress.percentage(), 0.0);

        progress.update_file("file1.txt".to_string(), 100);
        assert_eq!(progress.percentage(), 10.0);
        assert_eq!(progress.bytes_written, 100);
        assert_eq!(progress.records_written, 1);

        progress.add_unreadable("b.bin: stream did not contain valid UTF-8");
        assert_eq!(progress.unreadable.len(), 1);
    }

    #[test]
    fn test_cancel_check_stops_between_records() {
        let temp_dir = TempDir::new().unwrap();
        let a = source_file(temp_dir.path(), "a.txt", b"alpha");
        let b = source_file(temp_dir.path(), "b.txt", b"beta");
        let c = source_file(temp_dir.path(), "c.txt", b"gamma");
        let output = temp_dir.path().join("out.txt");

        let calls = std::cell::Cell::new(0usize);
        let cancel = || {
            calls.set(calls.get() + 1);
            if calls.get() > 1 {
                Err(TreecatError::Cancelled)
            } else {
                Ok(())
            }
        };

        let mut writer = BundleWriter::create(&output).unwrap();
        let result = writer.write_records(&[a, b, c], None, Some(&cancel));
        assert!(matches!(result.unwrap_err(), TreecatError::Cancelled));
        drop(writer);

        // Only the record written before the stop survives.
        let bundle = fs::read_to_string(&output).unwrap();
        assert_eq!(bundle.matches("===== ").count(), 1);
        assert!(bundle.contains("alpha"));
        assert!(!bundle.contains("gamma"));
    }

    #[test]
    fn test_pending_cancel_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let a = source_file(temp_dir.path(), "a.txt", b"alpha");
        let output = temp_dir.path().join("out.txt");

        let cancel = || -> Result<()> { Err(TreecatError::Cancelled) };

        let mut writer = BundleWriter::create(&output).unwrap();
        let result = writer.write_records(&[a], None, Some(&cancel));
        assert!(matches!(result.unwrap_err(), TreecatError::Cancelled));
        drop(writer);

        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }

    #[test]
    fn test_empty_file_list_writes_empty_bundle() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.txt");

        let mut writer = BundleWriter::create(&output).unwrap();
        let progress = writer.write_records(&[], None, None).unwrap();
        drop(writer);

        assert_eq!(progress.records_written, 0);
        assert_eq!(fs::read_to_string(&output).unwrap(), "");
    }
}
