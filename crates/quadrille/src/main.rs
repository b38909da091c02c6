use anyhow::Context as _;
use clap::{Parser, Subcommand};
use quadrille::{
    codec, driver::TableDef, first_sets::FirstSets, lr1::Automaton, minic,
    parse_table::ParseTable,
};
use quadrille_runtime::engine::{Driver, Token};
use std::{
    fs,
    io::Read as _,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the parse table for the built-in grammar and write it as CSV.
    Table {
        /// Path of the generated table file.
        #[arg(short, long, default_value = "table.csv")]
        output: PathBuf,

        /// Also dump the item-set collection to the specified path.
        #[arg(long)]
        automaton: Option<PathBuf>,
    },

    /// Translate a token stream into the quadruple listing.
    Translate {
        /// Reload the parse table from a CSV file instead of rebuilding it.
        #[arg(long)]
        table: Option<PathBuf>,

        /// Token file with one `<lexeme> <category>` pair per line;
        /// standard input when omitted.
        input: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    match args.command {
        Command::Table { output, automaton } => write_table(&output, automaton.as_deref()),
        Command::Translate { table, input } => translate(table.as_deref(), input.as_deref()),
    }
}

fn write_table(output: &Path, automaton_out: Option<&Path>) -> anyhow::Result<()> {
    let grammar = minic::grammar()?.augment();

    let s = Instant::now();
    let first_sets = FirstSets::new(&grammar);
    let automaton = Automaton::generate(&grammar, &first_sets)?;
    let table = ParseTable::generate(&automaton, &grammar)?;
    tracing::info!("table generation: {:?} elapsed", s.elapsed());

    if let Some(path) = automaton_out {
        fs::write(path, automaton.display(&grammar).to_string())
            .with_context(|| anyhow::anyhow!("failed to write {}", path.display()))?;
    }

    fs::write(output, codec::encode(&grammar, &table))
        .with_context(|| anyhow::anyhow!("failed to write {}", output.display()))?;

    Ok(())
}

fn translate(table_file: Option<&Path>, input: Option<&Path>) -> anyhow::Result<()> {
    let grammar = minic::grammar()?.augment();

    let table = match table_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| anyhow::anyhow!("failed to read {}", path.display()))?;
            codec::decode(&grammar, &text)
                .with_context(|| anyhow::anyhow!("invalid table file {}", path.display()))?
        }
        None => {
            let first_sets = FirstSets::new(&grammar);
            let automaton = Automaton::generate(&grammar, &first_sets)?;
            ParseTable::generate(&automaton, &grammar)?
        }
    };

    let tokens = read_tokens(input)?;

    let s = Instant::now();
    let def = TableDef::new(&grammar, &table);
    let mut driver = Driver::new(def, &minic::ACTIONS[..]);
    let ir = driver.parse(tokens)?;
    tracing::info!("translation: {:?} elapsed", s.elapsed());

    print!("{}", ir);
    Ok(())
}

fn read_tokens(input: Option<&Path>) -> anyhow::Result<Vec<Token>> {
    let text = match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| anyhow::anyhow!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read standard input")?;
            buf
        }
    };

    let mut tokens = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(lexeme), Some(category), None) => tokens.push(minic::token(lexeme, category)),
            _ => anyhow::bail!("line {}: expected `<lexeme> <category>`", index + 1),
        }
    }
    Ok(tokens)
}
