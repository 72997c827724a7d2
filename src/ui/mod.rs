pub mod bindings;
pub mod render;

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::App;
use crate::domain::actions::Action;
use crate::storage::config::LayoutConfig;
use bindings::BindingTable;

const EVENT_POLL: Duration = Duration::from_millis(100);

pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    bindings: BindingTable,
    help: String,
}

impl Tui {
    pub fn new(layout: LayoutConfig) -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        let bindings = BindingTable::new(&layout);
        let help = bindings.help_line();
        Ok(Self {
            terminal,
            bindings,
            help,
        })
    }

    pub fn run(&mut self, app: &mut App) -> Result<()> {
        let size = self.terminal.size()?;
        app.apply_size(size.width, size.height);

        while app.running {
            let now = Instant::now();
            app.pump(now);
            app.tick(now);

            let help = &self.help;
            self.terminal
                .draw(|frame| render::render(frame, app, help))
                .map_err(anyhow::Error::from)?;

            if event::poll(EVENT_POLL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        self.handle_key_event(app, key)
                    }
                    Event::Resize(cols, rows) => app.observe_resize(cols, rows, Instant::now()),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    fn handle_key_event(&mut self, app: &mut App, key: KeyEvent) {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            app.quit();
            return;
        }

        // An open alert swallows input until dismissed.
        if app.alert().is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                dispatch(app, Action::DismissAlert);
            }
            return;
        }

        if app.filter_active() {
            match key.code {
                KeyCode::Esc => app.close_filter(false),
                KeyCode::Enter => app.close_filter(true),
                KeyCode::Backspace => app.backspace_filter(),
                KeyCode::Up => dispatch(app, Action::SelectPrevious),
                KeyCode::Down => dispatch(app, Action::SelectNext),
                KeyCode::Char(c) => app.push_filter_char(c),
                _ => {}
            }
            return;
        }

        if let Some(action) = self.bindings.resolve(key) {
            dispatch(app, action);
        }
    }
}

fn dispatch(app: &mut App, action: Action) {
    if let Err(err) = app.handle_action(action) {
        app.status_message = format!("Error: {err}");
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = self.terminal.backend_mut().execute(LeaveAlternateScreen);
    }
}
