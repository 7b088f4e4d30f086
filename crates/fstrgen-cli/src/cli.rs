use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn should_colorize(self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }
}

#[derive(Parser)]
#[command(name = "fstrgen", bin_name = "fstrgen")]
#[command(about = "Inject to_string() and format_as() formatting boilerplate into C++ sources")]
#[command(after_help = r#"EXAMPLES:
  fstrgen point.cpp
  fstrgen -Iinclude --std c++17 src/shapes.cpp src/colors.cpp
  fstrgen point.cpp -o -
  fstrgen point.cpp --dump-decls

Without -o, each input FILE is rewritten next to itself as
<stem>.<suffix>.<ext>. Inputs are independent: a failing file is
reported and skipped, the rest still rewrite."#)]
pub struct Cli {
    /// Input C++ files
    #[arg(value_name = "FILE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Header search directory (accepted for compiler compatibility)
    #[arg(short = 'I', value_name = "DIR")]
    pub include_dirs: Vec<String>,

    /// Macro definition (accepted for compiler compatibility)
    #[arg(short = 'D', value_name = "MACRO")]
    pub defines: Vec<String>,

    /// Language standard, e.g. c++17
    #[arg(long = "std", value_name = "STD")]
    pub std: Option<String>,

    /// Output path; `-` writes to stdout. Requires a single input.
    #[arg(short = 'o', long = "output", value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Suffix for sibling outputs (<stem>.<suffix>.<ext>)
    #[arg(long, value_name = "SUFFIX", default_value = "gen")]
    pub suffix: String,

    /// Print the collected declaration records as JSON instead of rewriting
    #[arg(long)]
    pub dump_decls: bool,

    /// Colorize diagnostics
    #[arg(long, value_name = "WHEN", value_enum, default_value = "auto")]
    pub color: ColorChoice,
}
