use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use asm24::{config::Config, dump, emit, error::Error, macros, parser::Line, Assembly};
use color_print::cprintln;

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Source files, with or without `.as`
    #[clap(required = true)]
    files: Vec<PathBuf>,

    /// YAML config file
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Directory for generated files
    #[clap(short, long)]
    out_dir: Option<PathBuf>,

    /// Legacy symbol rules: duplicates, undefined labels and entries are warnings
    #[clap(long)]
    compat: bool,

    /// Dump object words next to the source
    #[clap(short, long)]
    dump: bool,
}

impl Args {
    fn config(&self) -> Result<Config, Error> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if self.out_dir.is_some() {
            config.out_dir = self.out_dir.clone();
        }
        config.compat |= self.compat;
        Ok(config)
    }
}

/// Source path and output stem for one command-line argument.
fn paths(arg: &Path, config: &Config) -> (PathBuf, PathBuf) {
    let source = match arg.extension() {
        Some(ext) if ext == "as" => arg.to_path_buf(),
        _ => emit::output_path(arg, "as"),
    };
    let stem = source.with_extension("");
    let stem = match (&config.out_dir, stem.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => stem,
    };
    (source, stem)
}

fn run(arg: &Path, config: &Config, show_dump: bool) -> Result<bool, Error> {
    let (source, stem) = paths(arg, config);
    let name = source.display().to_string();

    println!("1. Preprocess");
    println!("  < {}", name);
    let text = fs::read_to_string(&source).map_err(|e| Error::FileOpen(name.clone(), e))?;
    let expanded = match macros::expand(&Line::split(&name, &text), config) {
        Ok(lines) => lines,
        Err(msgs) => {
            msgs.dump();
            return Ok(false);
        }
    };
    let am = emit::output_path(&stem, "am");
    let mut am_text = expanded.join("\n");
    am_text.push('\n');
    fs::write(&am, &am_text).map_err(|e| Error::FileCreate(am.display().to_string(), e))?;
    println!("  > {}", am.display());

    println!("2. Assemble");
    let asm: Assembly = match asm24::assemble(&am.display().to_string(), &am_text, config) {
        Ok(asm) => asm,
        Err(fatal) => {
            fatal.msgs.dump();
            return Err(fatal.err);
        }
    };
    asm.msgs.dump();
    if show_dump {
        dump::print_dump(&asm);
    }
    if !asm.is_ok() {
        cprintln!(
            "<r,s>{} error(s)</>, no output written for {}",
            asm.msgs.error_count(),
            name
        );
        return Ok(false);
    }

    println!("3. Emit");
    for path in emit::write_outputs(&asm, &stem)? {
        println!("  > {}", path.display());
    }
    Ok(true)
}

fn main() -> ExitCode {
    use clap::Parser;

    env_logger::init();
    let args: Args = Args::parse();
    println!("asm24: two-pass assembler for the 24-bit teaching CPU");

    let config = match args.config() {
        Ok(config) => config,
        Err(err) => {
            cprintln!("<red,bold>error</>: {}", err);
            return ExitCode::FAILURE;
        }
    };
    log::debug!("{:?}", config);

    let mut failed = 0;
    for arg in &args.files {
        match run(arg, &config, args.dump) {
            Ok(true) => {}
            Ok(false) => failed += 1,
            Err(err) => {
                // Fatal for this file only; the remaining files still run.
                cprintln!("<red,bold>error</>: {}", err);
                if let Some(cause) = std::error::Error::source(&err) {
                    cprintln!("  <blue>caused by</>: {}", cause);
                }
                failed += 1;
            }
        }
    }
    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_and_stem() {
        let config = Config::default();
        assert_eq!(
            paths(Path::new("prog"), &config),
            (PathBuf::from("prog.as"), PathBuf::from("prog"))
        );
        assert_eq!(
            paths(Path::new("dir/prog.as"), &config),
            (PathBuf::from("dir/prog.as"), PathBuf::from("dir/prog"))
        );

        let config = Config {
            out_dir: Some(PathBuf::from("build")),
            ..Config::default()
        };
        assert_eq!(
            paths(Path::new("src/prog"), &config),
            (PathBuf::from("src/prog.as"), PathBuf::from("build/prog"))
        );
    }
}
