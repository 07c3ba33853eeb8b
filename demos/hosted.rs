// A small hosted review session: JSON api plus a single embedded page.

use termcoach::answer::verify;
use termcoach::catalog::load_term_catalog;
use termcoach::session::{SessionMode, SessionState, StudySession};
use termcoach::store::{YamlProgressStore, YamlStudyLog};
use termcoach::traits::{Rating, TrainerError};

use ascii::AsciiString;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::SystemTime;
use tiny_http::{Request, Response, ResponseBox};

use clap::Parser;

type BackendError = Box<dyn std::error::Error + Send + Sync>;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
  <body>
    <p>termcoach api: GET /api/card, POST /api/answer {"text": ...},
       POST /api/rate {"rating": 0..5}</p>
  </body>
</html>"#;

#[derive(Debug, Serialize)]
struct CardResponse {
    state: String,
    definition: Option<String>,
    position: usize,
    queue_len: usize,
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct AnswerResponse {
    correct: bool,
    term: String,
}

#[derive(Debug, Deserialize)]
struct RateRequest {
    rating: u8,
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Idle => "idle",
        SessionState::Active => "active",
        SessionState::Complete => "complete",
    }
}

struct Hoster {
    session: RwLock<StudySession>,
}

impl Hoster {
    fn card(&self) -> CardResponse {
        let session = self.session.read();
        CardResponse {
            state: state_name(session.state()).to_owned(),
            definition: session.current().map(|t| t.definition.clone()),
            position: session.position(),
            queue_len: session.queue_len(),
        }
    }

    fn answer(&self, request: &AnswerRequest) -> Result<AnswerResponse, BackendError> {
        let session = self.session.read();
        let term = session.current().ok_or("no card to answer")?;
        Ok(AnswerResponse {
            correct: verify(&request.text, &term.term),
            term: term.term.clone(),
        })
    }

    fn rate(&self, request: &RateRequest) -> Result<CardResponse, BackendError> {
        let rating = Rating::from_value(request.rating)?;
        let mut session = self.session.write();
        session.rate(rating, SystemTime::now())?;
        drop(session);
        Ok(self.card())
    }

    fn handle(&self, rq: &mut Request) -> Result<ResponseBox, BackendError> {
        let url = rq.url().to_string();
        let path = url.strip_prefix('/').unwrap_or(&url);
        match path {
            "" | "index.html" => Ok(Response::from_string(INDEX_HTML)
                .with_header(tiny_http::Header {
                    field: "Content-Type".parse().unwrap(),
                    value: AsciiString::from_ascii("text/html; charset=utf8").unwrap(),
                })
                .boxed()),
            "api/card" => Ok(json_response(&self.card())?),
            "api/answer" => {
                let mut content = String::new();
                rq.as_reader().read_to_string(&mut content)?;
                let request: AnswerRequest = serde_json::from_str(&content)?;
                Ok(json_response(&self.answer(&request)?)?)
            }
            "api/rate" => {
                let mut content = String::new();
                rq.as_reader().read_to_string(&mut content)?;
                let request: RateRequest = serde_json::from_str(&content)?;
                Ok(json_response(&self.rate(&request)?)?)
            }
            _ => Ok(Response::from_string("Nothing handles this request")
                .with_status_code(tiny_http::StatusCode(404))
                .boxed()),
        }
    }
}

fn json_response<T: Serialize>(value: &T) -> Result<ResponseBox, BackendError> {
    Ok(Response::from_string(serde_json::to_string_pretty(value)?)
        .with_header(tiny_http::Header {
            field: "Content-Type".parse().unwrap(),
            value: AsciiString::from_ascii("application/json").unwrap(),
        })
        .boxed())
}

/// A hosted review session.
#[derive(Parser, Debug)]
#[clap(long_about = None)]
struct Args {
    /// The catalog yaml file to study from.
    catalog: String,

    /// Storage directory for progress and study time.
    #[clap(short, long, default_value = "/tmp/")]
    storage: String,

    /// Address to listen on.
    #[clap(short, long, default_value = "0.0.0.0:8080")]
    listen: String,
}

pub fn main() -> Result<(), BackendError> {
    let args = Args::parse();

    let catalog = load_term_catalog(&args.catalog)?;
    let storage = PathBuf::from(&args.storage);
    let store = YamlProgressStore::new(
        &storage.join("termcoach_progress.yaml").to_string_lossy(),
    )?;
    let study_log = YamlStudyLog::new(
        &storage.join("termcoach_study_time.yaml").to_string_lossy(),
    )?;

    let mut session = StudySession::new(Box::new(store), Box::new(study_log));
    let now = SystemTime::now();
    let mut rng = rand::thread_rng();
    match session.start(catalog.terms(), SessionMode::DueOnly, now, &mut rng) {
        Ok(()) => {}
        Err(TrainerError::NothingDue) => {
            println!("Nothing due, starting a full review.");
            session.start(catalog.terms(), SessionMode::ForceAll, now, &mut rng)?;
        }
        Err(e) => return Err(e.into()),
    }

    let server = Arc::new(tiny_http::Server::http(&args.listen as &str)?);
    println!("Now listening on {}", args.listen);

    let hoster = Arc::new(Hoster {
        session: RwLock::new(session),
    });

    // Serve the webserver with 4 threads.
    let mut handles = Vec::new();
    for _ in 0..4 {
        let server = server.clone();
        let hoster = hoster.clone();

        handles.push(thread::spawn(move || {
            for mut rq in server.incoming_requests() {
                let response = match hoster.handle(&mut rq) {
                    Ok(response) => response,
                    Err(e) => Response::from_string(format!("{e:?}"))
                        .with_status_code(tiny_http::StatusCode(500))
                        .boxed(),
                };
                let _ = rq.respond(response);
            }
        }));
    }

    for h in handles {
        let _ = h.join();
    }
    Ok(())
}
