/// cocode-scanner: Find commented-out C/C++ code.
///
/// Scans a file or a directory tree, classifies every comment as prose or code
/// and records the position of each code-like comment in a cppcheck-style XML
/// report, either a new one (--dump-xml) or an existing one (--add-xml).
mod classify;
mod error;
mod frontend;
mod lexer;
mod models;
mod normalize;
mod remove;
mod report;
mod scanner;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use error::CocodeError;
use frontend::Frontend;
use lexer::LangStandard;
use models::{CommentRecord, FileScan, PositionIndex};

#[derive(Parser)]
#[command(name = "cocode-scanner", about = "Find commented-out C/C++ code and report it in cppcheck XML format")]
struct Cli {
    /// Directory to scan recursively (defaults to the current directory)
    #[arg(long, num_args = 0..=1, default_missing_value = ".", conflicts_with = "file")]
    dir: Option<PathBuf>,

    /// A single file to process
    #[arg(long)]
    file: Option<PathBuf>,

    /// Dump the result into a new XML report in cppcheck format
    #[arg(long = "dump-xml", alias = "dump_xml", conflicts_with = "add_xml")]
    dump_xml: Option<PathBuf>,

    /// Add the result to an existing XML report
    #[arg(long = "add-xml", alias = "add_xml")]
    add_xml: Option<PathBuf>,

    /// Remove the commented-out code from this source file in place
    #[arg(long = "remove-cocode", alias = "remove_cocode")]
    remove_cocode: Option<PathBuf>,

    /// Also write every flagged comment as JSON lines. An extra listing, not
    /// a report: use --dump-xml or --add-xml to record positions
    #[arg(long)]
    jsonl: Option<PathBuf>,

    /// Language standard used to lex comment bodies
    #[arg(long, value_enum, default_value = "c++11")]
    std: LangStandard,

    /// Tokenizer for the full-file pass
    #[arg(long, value_enum, default_value = "tree-sitter")]
    frontend: Frontend,

    /// C/C++ file extensions scanned in directory mode
    #[arg(long, default_value = scanner::DEFAULT_EXTENSIONS)]
    extensions: String,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_jsonl(path: &Path, scans: &[FileScan]) -> anyhow::Result<usize> {
    let file = fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let mut written = 0;
    for record in scans.iter().flat_map(CommentRecord::from_scan) {
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

fn run_remove(cli: &Cli, target: &Path) -> anyhow::Result<()> {
    let mut tokenizer = cli.frontend.tokenizer(cli.std)?;
    let scan = scanner::scan_file(tokenizer.as_mut(), target, cli.std)?;
    let texts: Vec<String> = scan.comments.into_iter().map(|c| c.text).collect();
    remove::remove_comments(target, &texts)?;
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    /// No output mode was selected; nothing was scanned.
    Usage,
}

fn run(cli: Cli) -> anyhow::Result<Outcome> {
    let reporting = cli.dump_xml.is_some() || cli.add_xml.is_some() || cli.jsonl.is_some();
    if !reporting && cli.remove_cocode.is_none() {
        eprintln!("Invalid arguments. Use --help to show the help message.");
        return Ok(Outcome::Usage);
    }

    // Refuse before scanning anything
    if let Some(path) = &cli.dump_xml {
        if path.exists() {
            return Err(CocodeError::ReportExists(path.clone()).into());
        }
    }
    if let Some(path) = &cli.add_xml {
        if !path.exists() {
            return Err(CocodeError::ReportMissing(path.clone()).into());
        }
    }

    if reporting {
        run_report(&cli)?;
    }
    // After the report scan
    if let Some(target) = &cli.remove_cocode {
        run_remove(&cli, target)
            .with_context(|| format!("failed to remove commented-out code from {}", target.display()))?;
    }

    Ok(Outcome::Done)
}

fn run_report(cli: &Cli) -> anyhow::Result<()> {
    let t0 = Instant::now();
    let mut tokenizer = cli.frontend.tokenizer(cli.std)?;
    let (scans, index) = match &cli.file {
        Some(file) => {
            let scans = vec![scanner::scan_file(tokenizer.as_mut(), file, cli.std)?];
            let index = PositionIndex::from_scans(&scans);
            (scans, index)
        }
        None => {
            let root = cli.dir.clone().unwrap_or_else(|| PathBuf::from("."));
            let scans = scanner::scan_dir(tokenizer.as_mut(), &root, &cli.extensions, cli.std);
            let index = PositionIndex::from_scans(&scans).relative_to(&root);
            (scans, index)
        }
    };
    if index.is_empty() {
        info!("no commented-out code found");
    }
    info!(
        files = scans.len(),
        flagged = index.len(),
        elapsed_s = t0.elapsed().as_secs_f64(),
        "scan complete"
    );

    if let Some(path) = &cli.jsonl {
        let written = write_jsonl(path, &scans)?;
        info!(records = written, output = %path.display(), "wrote JSON lines");
    }
    let written = if let Some(path) = &cli.dump_xml {
        report::create(path, &index)?;
        Some(path)
    } else if let Some(path) = &cli.add_xml {
        report::extend(path, &index)?;
        Some(path)
    } else {
        None
    };
    if let Some(path) = written {
        let total = report::read_locations(path)?.len();
        info!(report = %path.display(), total, "report holds {total} locations");
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::Usage) => ExitCode::from(2),
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cocode-scanner").chain(args.iter().copied())).unwrap()
    }

    fn path_arg(path: &Path) -> &str {
        path.to_str().unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&["--dir", "--dump-xml", "out.xml"]);
        assert_eq!(cli.dir, Some(PathBuf::from(".")));
        assert_eq!(cli.std, LangStandard::Cxx11);
        assert_eq!(cli.frontend, Frontend::TreeSitter);
        assert_eq!(cli.extensions, "cpp,hpp,cc,h,cxx,c");
        assert_eq!(cli.dump_xml, Some(PathBuf::from("out.xml")));
    }

    #[test]
    fn test_cli_conflicts() {
        assert!(Cli::try_parse_from(["cocode-scanner", "--file", "a.c", "--dir", "src"]).is_err());
        assert!(
            Cli::try_parse_from(["cocode-scanner", "--dump-xml", "a.xml", "--add-xml", "b.xml"]).is_err()
        );
        let cli = parse(&["--add_xml", "b.xml", "--std", "c++20"]);
        assert_eq!(cli.add_xml, Some(PathBuf::from("b.xml")));
        assert_eq!(cli.std, LangStandard::Cxx20);
    }

    #[test]
    fn test_jsonl_help_points_to_report_modes() {
        let command = Cli::command();
        let jsonl = command
            .get_arguments()
            .find(|a| a.get_id() == "jsonl")
            .unwrap();
        let help = jsonl.get_help().unwrap().to_string();
        assert!(help.contains("not a report"));
        assert!(help.contains("--dump-xml"));
    }

    #[test]
    fn test_no_mode_is_usage_error() {
        let cli = parse(&["--dir", "."]);
        assert_eq!(run(cli).unwrap(), Outcome::Usage);
    }

    #[test]
    fn test_dump_xml_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("main.cpp");
        let mut text = String::from("int main() {\n");
        text.push_str(&"\n".repeat(8));
        text.push_str("// int x = 5;\n\n// This is documentation.\nreturn 0;\n}\n");
        fs::write(&source, text).unwrap();
        let out = dir.path().join("report.xml");
        let jsonl = dir.path().join("found.jsonl");

        let cli = parse(&[
            "--file",
            path_arg(&source),
            "--dump-xml",
            path_arg(&out),
            "--jsonl",
            path_arg(&jsonl),
        ]);
        assert_eq!(run(cli).unwrap(), Outcome::Done);

        let found = report::read_locations(&out).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].line, found[0].column), (10, 1));

        let lines = fs::read_to_string(&jsonl).unwrap();
        assert_eq!(lines.lines().count(), 1);
        let record: CommentRecord = serde_json::from_str(lines.lines().next().unwrap()).unwrap();
        assert_eq!(record.text, "// int x = 5;");
        assert_eq!((record.line, record.column), (10, 1));
    }

    #[test]
    fn test_dump_xml_refuses_existing_report_before_scanning() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.xml");
        fs::write(&out, "old").unwrap();

        let cli = parse(&["--dir", path_arg(dir.path()), "--dump-xml", path_arg(&out)]);
        let err = run(cli).unwrap_err();
        assert!(matches!(err.downcast_ref::<CocodeError>(), Some(CocodeError::ReportExists(_))));
        assert_eq!(fs::read_to_string(&out).unwrap(), "old");
    }

    #[test]
    fn test_add_xml_missing_report() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("absent.xml");

        let cli = parse(&["--dir", path_arg(dir.path()), "--add-xml", path_arg(&out)]);
        let err = run(cli).unwrap_err();
        assert!(matches!(err.downcast_ref::<CocodeError>(), Some(CocodeError::ReportMissing(_))));
        assert!(!out.exists());
    }

    #[test]
    fn test_add_xml_directory_mode_uses_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/a.c"), "int a;\n/* a = 2; */\n").unwrap();
        let out = dir.path().join("report.xml");
        fs::write(&out, "<results><errors/></results>").unwrap();

        let cli = parse(&[
            "--dir",
            path_arg(&root),
            "--add-xml",
            path_arg(&out),
            "--frontend",
            "native",
        ]);
        assert_eq!(run(cli).unwrap(), Outcome::Done);

        let found = report::read_locations(&out).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(Path::new(&found[0].file), Path::new("src").join("a.c"));
        assert_eq!((found[0].line, found[0].column), (2, 1));
    }

    #[test]
    fn test_remove_cocode() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.cpp");
        fs::write(&source, "int a; // a++;\n// counts the apples in the basket\n").unwrap();

        let cli = parse(&["--remove-cocode", path_arg(&source)]);
        assert_eq!(run(cli).unwrap(), Outcome::Done);
        assert_eq!(
            fs::read_to_string(&source).unwrap(),
            "int a; \n// counts the apples in the basket\n"
        );
    }

    #[test]
    fn test_remove_cocode_after_report() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.cpp");
        fs::write(&source, "int a;\n// a++;\nint b; /* b = 2; */\n").unwrap();
        let out = dir.path().join("report.xml");

        let cli = parse(&[
            "--file",
            path_arg(&source),
            "--dump-xml",
            path_arg(&out),
            "--remove-cocode",
            path_arg(&source),
        ]);
        assert_eq!(run(cli).unwrap(), Outcome::Done);

        let found: Vec<_> = report::read_locations(&out)
            .unwrap()
            .into_iter()
            .map(|l| (l.line, l.column))
            .collect();
        assert_eq!(found, vec![(2, 1), (3, 8)]);
        assert_eq!(fs::read_to_string(&source).unwrap(), "int a;\n\nint b; \n");
    }
}
