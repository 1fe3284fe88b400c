use std::io::stdout;
use std::time::Duration;

use color_eyre::Result;
use crossterm::event::KeyEvent;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use tracing::{info, warn};

use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::prefs::PrefsStore;
use crate::store::{ResourceKey, Store};
use crate::ui::components::command_input::{CommandEvent, CommandInput};
use crate::ui::components::KeyResult;
use crate::ui::renderfns::{draw_footer, draw_header};
use crate::ui::theme::Theme;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{BoardView, HomeView, ProjectListView, SearchView};

/// Application shell: view stack, command input, store, and preferences.
pub struct App {
  config: Config,
  store: Store,
  prefs: PrefsStore,
  host: String,

  /// Navigation stack - root is always at index 0
  views: Vec<Box<dyn View>>,
  command: CommandInput,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, store: Store, prefs: PrefsStore, host: String) -> Self {
    Self {
      config,
      store,
      prefs,
      host,
      views: Vec::new(),
      command: CommandInput::new(),
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // The sidebar reads the project list for the whole session, so the app
    // holds its own subscription alongside whatever views subscribe.
    self.store.subscribe(ResourceKey::Projects);

    let mut home = Box::new(HomeView::new(self.config.default_project));
    home.mounted(&mut self.store);
    self.views.push(home);

    let mut events = EventHandler::new(Duration::from_millis(250));

    while !self.should_quit {
      terminal.draw(|frame| self.draw(frame))?;

      if let Some(event) = events.next().await {
        match event {
          Event::Tick => {
            self.store.poll();
            self.store.sweep();
          }
          Event::Key(key) => self.handle_key(key),
        }
      }
    }

    for view in self.views.iter_mut().rev() {
      view.unmounted(&mut self.store);
    }
    self.views.clear();

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn handle_key(&mut self, key: KeyEvent) {
    // A visible mutation error eats the next key to dismiss itself.
    if self.store.last_mutation_error().is_some() {
      self.store.clear_mutation_error();
      return;
    }

    match self.command.handle_key(key) {
      KeyResult::Event(CommandEvent::Submitted(cmd)) => {
        self.execute_command(&cmd);
        return;
      }
      KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
      KeyResult::NotHandled => {}
    }

    let action = match self.views.last_mut() {
      Some(view) => view.handle_key(key, &mut self.store),
      None => ViewAction::None,
    };
    self.apply_action(action);
  }

  fn apply_action(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(mut view) => {
        view.mounted(&mut self.store);
        self.views.push(view);
      }
      ViewAction::Pop => {
        if let Some(mut view) = self.views.pop() {
          view.unmounted(&mut self.store);
        }
        if self.views.is_empty() {
          self.should_quit = true;
        }
      }
    }
  }

  /// Replace the whole stack with a new root view
  fn set_root(&mut self, mut view: Box<dyn View>) {
    for old in self.views.iter_mut().rev() {
      old.unmounted(&mut self.store);
    }
    self.views.clear();
    view.mounted(&mut self.store);
    self.views.push(view);
  }

  fn default_project_name(&self) -> String {
    let fallback = || {
      self
        .config
        .default_project
        .map(|id| format!("Project {}", id))
        .unwrap_or_else(|| "Board".to_string())
    };
    self
      .store
      .snapshot(&ResourceKey::Projects)
      .projects()
      .and_then(|projects| {
        projects
          .iter()
          .find(|p| Some(p.id) == self.config.default_project)
          .map(|p| p.name.clone())
      })
      .unwrap_or_else(fallback)
  }

  fn execute_command(&mut self, cmd: &str) {
    info!(command = cmd, "executing command");
    match cmd {
      "home" => self.set_root(Box::new(HomeView::new(self.config.default_project))),
      "board" => match self.config.default_project {
        Some(project_id) => {
          let name = self.default_project_name();
          self.apply_action(ViewAction::Push(Box::new(BoardView::new(project_id, name))));
        }
        None => warn!("no default project configured, use :projects instead"),
      },
      "projects" => self.apply_action(ViewAction::Push(Box::new(ProjectListView::new()))),
      "search" => self.apply_action(ViewAction::Push(Box::new(SearchView::new()))),
      "theme" => self.prefs.toggle_dark_mode(),
      "sidebar" => self.prefs.toggle_sidebar(),
      "quit" => self.should_quit = true,
      "" => {}
      other => warn!(command = other, "unknown command"),
    }
  }

  fn draw(&mut self, frame: &mut Frame) {
    let theme = Theme::from_prefs(&self.prefs.get());

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
      ])
      .split(frame.area());

    draw_header(
      frame,
      chunks[0],
      &theme,
      &self.host,
      &self.default_project_name(),
      self.store.pending_mutations(),
    );

    let content_area = if self.prefs.is_sidebar_collapsed() {
      chunks[1]
    } else {
      let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(chunks[1]);
      Self::render_sidebar(frame, main[0], &self.store, &theme, self.config.default_project);
      main[1]
    };

    if let Some(view) = self.views.last_mut() {
      view.render(frame, content_area, &self.store, &theme);
    }

    let breadcrumb: Vec<String> = self.views.iter().map(|v| v.breadcrumb_label()).collect();
    let shortcuts = self
      .views
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default();
    draw_footer(
      frame,
      chunks[2],
      &theme,
      &breadcrumb,
      &shortcuts,
      self.store.last_mutation_error(),
    );

    // Overlays draw on top of everything else.
    self.command.render_overlay(frame, content_area, &theme);
  }

  fn render_sidebar(
    frame: &mut Frame,
    area: Rect,
    store: &Store,
    theme: &Theme,
    default_project: Option<u64>,
  ) {
    let block = Block::default()
      .title(" Projects ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(theme.border));

    let snapshot = store.snapshot(&ResourceKey::Projects);
    let Some(projects) = snapshot.projects() else {
      let message = if snapshot.is_error() {
        "unavailable"
      } else {
        "loading..."
      };
      let paragraph = Paragraph::new(message)
        .block(block)
        .style(Style::default().fg(theme.dim));
      frame.render_widget(paragraph, area);
      return;
    };

    let items: Vec<ListItem> = projects
      .iter()
      .map(|project| {
        let style = if Some(project.id) == default_project {
          Style::default().fg(theme.accent).bold()
        } else {
          Style::default().fg(theme.text)
        };
        ListItem::new(Line::from(Span::styled(
          crate::ui::renderfns::utils::truncate(&project.name, 24),
          style,
        )))
      })
      .collect();

    frame.render_widget(List::new(items).block(block), area);
  }
}
