use termcoach::catalog::{save_term_catalog, Chapter, TermCatalog};
use termcoach::traits::{ChapterId, Id, Term, TermId};

use clap::Parser;

/// Convert simple text files to a term catalog. Put each term on a line,
/// separate the term and its definition with a '|' character; an optional
/// third field becomes the explanation. Each input file becomes one chapter
/// titled after the file stem.
#[derive(Parser, Debug)]
#[clap(long_about = None)]
struct Args {
    /// The output file (inclusive).
    #[clap(short, long)]
    output: String,

    /// Name to associate with the catalog.
    #[clap(short, long, default_value = "terminology")]
    name: String,

    /// The files to read.
    #[clap(required = true)]
    inputs: Vec<String>,
}

fn str_to_hash(v: &str) -> Id {
    use md5::{Digest, Md5};

    let mut hasher = Md5::new();
    hasher.update(v);
    let result: [u8; 16] = hasher.finalize().into();

    let mut truncated = [0u8; 8];
    truncated.copy_from_slice(&result[..8]);
    Id::from_le_bytes(truncated)
}

fn read_terms_from_txt(
    input: &str,
    chapter: ChapterId,
) -> Result<Vec<Term>, Box<dyn std::error::Error>> {
    use std::io::BufRead;
    let mut terms = vec![];
    let file = std::fs::File::open(input).map_err(|e| format!("failed to open {input}: {e}"))?;
    for line in std::io::BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entries: Vec<&str> = line.split('|').map(|v| v.trim()).collect();
        if entries.len() < 2 {
            return Err(format!("failed to find two entries in: {line}").into());
        }
        terms.push(Term {
            id: TermId(str_to_hash(&line)),
            chapter,
            term: entries[0].to_owned(),
            definition: entries[1].to_owned(),
            explanation: entries.get(2).map(|e| (*e).to_owned()),
        });
    }
    Ok(terms)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut chapters = vec![];
    let mut terms = vec![];
    for input in args.inputs.iter() {
        let title = std::path::Path::new(input)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.clone());
        let chapter = Chapter {
            id: ChapterId(str_to_hash(&title)),
            title,
        };
        terms.extend(read_terms_from_txt(input, chapter.id)?);
        chapters.push(chapter);
    }

    let catalog = TermCatalog::new(&args.name, &chapters, &terms)?;
    save_term_catalog(&args.output, &catalog)?;
    Ok(())
}
