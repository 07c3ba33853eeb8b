use termcoach::answer::verify;
use termcoach::catalog::load_term_catalog;
use termcoach::quiz::{build_quiz, QuestionKind, DEFAULT_QUIZ_SIZE};
use termcoach::traits::{ChapterId, Term};

use clap::Parser;
use std::io::Write;

/// Run a self-test quiz over a term catalog on the command line.
#[derive(Parser, Debug)]
#[clap(long_about = None)]
struct Args {
    /// The catalog yaml file to quiz from.
    catalog: String,

    /// Number of questions to ask.
    #[clap(short, long, default_value_t = DEFAULT_QUIZ_SIZE)]
    size: usize,

    /// Restrict the quiz to a single chapter id.
    #[clap(short, long)]
    chapter: Option<u64>,
}

fn read_line(prompt: &str) -> Result<String, std::io::Error> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let catalog = load_term_catalog(&args.catalog)?;
    let pool: Vec<Term> = match args.chapter {
        Some(id) => catalog
            .chapter_terms(ChapterId(id))
            .into_iter()
            .cloned()
            .collect(),
        None => catalog.terms().to_vec(),
    };

    let mut rng = rand::thread_rng();
    let questions = build_quiz(&pool, args.size, &mut rng)?;

    let mut correct = 0;
    for (i, question) in questions.iter().enumerate() {
        println!();
        println!("{}. {}", i + 1, question.term.definition);

        let good = match question.kind {
            QuestionKind::MultipleChoice => {
                for (j, option) in question.options.iter().enumerate() {
                    let letter = (b'a' + j as u8) as char;
                    println!("   {letter}) {option}");
                }
                let picked = read_line("> ")?;
                let picked_index = picked
                    .chars()
                    .next()
                    .and_then(|c| (c.to_ascii_lowercase() as u8).checked_sub(b'a'))
                    .map(|j| j as usize);
                picked_index.is_some() && picked_index == question.correct_option()
            }
            QuestionKind::FreeText => {
                let typed = read_line("> ")?;
                verify(&typed, &question.term.term)
            }
        };

        if good {
            correct += 1;
            println!("Correct!");
        } else {
            println!("The answer was: {}", question.term.term);
            if let Some(explanation) = &question.term.explanation {
                println!("{explanation}");
            }
        }
    }

    println!();
    println!("Score: {correct} / {}", questions.len());
    Ok(())
}
