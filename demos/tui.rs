// Interactive review session in the terminal. Skeleton derived from
// https://github.com/fdehau/tui-rs/blob/v0.18.0/examples/user_input.rs

use termcoach::answer::verify;
use termcoach::catalog::load_term_catalog;
use termcoach::session::{SessionMode, SessionState, StudySession};
use termcoach::store::{YamlProgressStore, YamlStudyLog};
use termcoach::traits::{Rating, TrainerError};

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

use std::time::SystemTime;
use std::{error::Error, io};
use tui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans, Text},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use unicode_width::UnicodeWidthStr;

#[derive(PartialEq)]
enum ApplicationState {
    /// Definition shown, learner is typing their recall attempt.
    Prompt,
    /// Attempt graded, canonical term shown, waiting for a 0-5 rating.
    Reveal,
    /// Queue exhausted.
    Done,
}

struct App {
    state: ApplicationState,

    session: StudySession,

    /// Definition of the current term.
    definition: String,

    /// Current value of the input box.
    input: String,

    /// The canonical term, revealed after answering.
    answer: String,

    /// Whether the typed attempt matched the canonical term.
    answer_correct: bool,
}

impl App {
    fn new(catalog_path: &str) -> Result<App, Box<dyn Error>> {
        let catalog = load_term_catalog(catalog_path)?;
        let store = YamlProgressStore::new("/tmp/termcoach_progress.yaml")?;
        let study_log = YamlStudyLog::new("/tmp/termcoach_study_time.yaml")?;
        let mut session = StudySession::new(Box::new(store), Box::new(study_log));

        let now = SystemTime::now();
        let mut rng = rand::thread_rng();
        match session.start(catalog.terms(), SessionMode::DueOnly, now, &mut rng) {
            Ok(()) => {}
            // Nothing due right now, offer a full review instead.
            Err(TrainerError::NothingDue) => {
                session.start(catalog.terms(), SessionMode::ForceAll, now, &mut rng)?;
            }
            Err(e) => return Err(e.into()),
        }

        let mut app = App {
            state: ApplicationState::Prompt,
            session,
            definition: String::new(),
            input: String::new(),
            answer: String::new(),
            answer_correct: false,
        };
        app.populate_current();
        Ok(app)
    }

    fn populate_current(&mut self) {
        self.input.clear();
        self.answer.clear();
        match self.session.current() {
            Some(term) => {
                self.definition = term.definition.clone();
                self.state = ApplicationState::Prompt;
            }
            None => {
                self.state = ApplicationState::Done;
            }
        }
    }

    fn process_answer(&mut self) {
        if let Some(term) = self.session.current() {
            self.answer_correct = verify(&self.input, &term.term);
            self.answer = term.term.clone();
            self.state = ApplicationState::Reveal;
        }
    }

    fn rate(&mut self, rating: Rating) -> Result<(), Box<dyn Error>> {
        self.session.rate(rating, SystemTime::now())?;
        self.populate_current();
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Box<dyn Error>> {
        if self.session.state() == SessionState::Active {
            self.session.exit(SystemTime::now())?;
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let catalog_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| String::from("/tmp/termcoach_catalog.yaml"));
    let mut app = App::new(&catalog_path)?;

    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Now run the application.
    let res = run_app(&mut terminal, &mut app);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.finish()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Enter => {
                    if app.state == ApplicationState::Prompt {
                        app.process_answer();
                    }
                }
                KeyCode::Char(c) => match app.state {
                    ApplicationState::Prompt => {
                        app.input.push(c);
                    }
                    ApplicationState::Reveal => {
                        if let Some(digit) = c.to_digit(10) {
                            if let Ok(rating) = Rating::from_value(digit as u8) {
                                app.rate(rating)?;
                            }
                        }
                    }
                    ApplicationState::Done => {}
                },
                KeyCode::Backspace => {
                    if app.state == ApplicationState::Prompt {
                        app.input.pop();
                    }
                }
                KeyCode::Esc => {
                    return Ok(());
                }
                _ => {}
            }
        }
    }
}

fn ui<B: Backend>(f: &mut Frame<B>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1), // help
                Constraint::Length(1), // progress
                Constraint::Percentage(20),
                Constraint::Length(4), // definition
                Constraint::Length(3), // input
                Constraint::Length(1), // revealed answer
                Constraint::Length(1), // rating hint
                Constraint::Percentage(30),
            ]
            .as_ref(),
        )
        .split(f.size());

    const PROGRESS: usize = 1;
    const DEFINITION: usize = 3;
    const INPUT: usize = 4;
    const ANSWER: usize = 5;
    const HINT: usize = 6;

    let msg = vec![
        Span::raw("Press "),
        Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" to exit, "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" to submit answer."),
    ];
    let style = Style::default();
    let mut text = Text::from(Spans::from(msg));
    text.patch_style(style);
    f.render_widget(Paragraph::new(text), chunks[0]);

    let progress = Paragraph::new(format!(
        "{} / {}",
        app.session.position(),
        app.session.queue_len()
    ));
    f.render_widget(progress, chunks[PROGRESS]);

    if app.state == ApplicationState::Done {
        let done = Paragraph::new("Session complete.")
            .alignment(tui::layout::Alignment::Center)
            .block(Block::default());
        f.render_widget(done, chunks[DEFINITION]);
        return;
    }

    let definition = Paragraph::new(app.definition.as_ref())
        .wrap(tui::widgets::Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Definition"));
    f.render_widget(definition, chunks[DEFINITION]);

    let input_style = match app.state {
        ApplicationState::Prompt => Style::default().fg(Color::Yellow),
        _ => {
            if app.answer_correct {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            }
        }
    };
    let input = Paragraph::new(app.input.as_ref())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title("Your answer"));
    f.render_widget(input, chunks[INPUT]);
    if app.state == ApplicationState::Prompt {
        f.set_cursor(
            chunks[INPUT].x + app.input.width() as u16 + 1,
            chunks[INPUT].y + 1,
        );
    }

    if app.state == ApplicationState::Reveal {
        if !app.answer_correct {
            let answer = Paragraph::new(app.answer.as_ref())
                .alignment(tui::layout::Alignment::Center)
                .block(Block::default());
            f.render_widget(answer, chunks[ANSWER]);
        }
        let hint = Paragraph::new("Rate your recall: 0 (blank) .. 5 (perfect)")
            .alignment(tui::layout::Alignment::Center);
        f.render_widget(hint, chunks[HINT]);
    }
}
