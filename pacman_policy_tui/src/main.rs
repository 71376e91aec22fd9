use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pacman_policy_core::{
    GHOST_COUNT, Position,
    agent::{Agent, RandomAgent},
    config::PolicyConfig,
    environment::{Environment, Game, TurnOutcome},
    map::{Maze, Tile},
    policy::DecisionPolicy,
};
use ratatui::{
    crossterm::{
        self,
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
    widgets::*,
};
use std::{
    fs::File,
    io::{self, Stdout},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AgentKind {
    /// The multi-mode heuristic controller.
    Policy,
    /// Uniform random legal moves.
    Random,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Maze file to load
    #[arg(short, long, value_name = "MAZE_FILE", default_value = "mazes/classic.txt")]
    maze: PathBuf,

    /// Seed for the controller and the ghosts
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Controller driving the agent
    #[arg(short, long, value_enum, default_value_t = AgentKind::Policy)]
    agent: AgentKind,

    /// JSON file overriding policy thresholds
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Milliseconds between simulation ticks in the TUI
    #[arg(long, default_value_t = 120)]
    tick_ms: u64,

    /// Run without the terminal UI and print a summary
    #[arg(long)]
    headless: bool,

    /// Stop the match after this many ticks
    #[arg(long, default_value_t = 5000)]
    max_ticks: u64,

    /// Where tracing output goes
    #[arg(long, value_name = "LOG_FILE", default_value = "pacman_policy.log")]
    log_file: PathBuf,
}

/// The controller behind the agent, kept concrete so the status panel can show policy state.
enum Controller {
    Policy(DecisionPolicy),
    Random(RandomAgent),
}

impl Controller {
    fn as_agent(&mut self) -> &mut dyn Agent {
        match self {
            Controller::Policy(policy) => policy,
            Controller::Random(random) => random,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Controller::Policy(policy) => policy.name(),
            Controller::Random(random) => random.name(),
        }
    }

    fn status(&self) -> String {
        match self {
            Controller::Policy(policy) => {
                let mode = policy
                    .last_mode()
                    .map_or_else(|| "-".to_string(), |m| format!("{:?}", m));
                format!(
                    "Mode: {}  Captures this window: {}  Window open: {}",
                    mode,
                    policy.state().consumed_in_window(),
                    policy.state().power_window_open()
                )
            }
            Controller::Random(_) => "Mode: random".to_string(),
        }
    }
}

struct App {
    /// The simulation being played.
    game: Game,
    controller: Controller,
    max_ticks: u64,
    /// Last non-continue outcome, shown in the status panel.
    last_event: Option<TurnOutcome>,
    /// Flag to control the main loop.
    should_quit: bool,
    /// Flag to control if the game is over.
    game_over: bool,
}

impl App {
    fn new(args: &Args) -> Result<Self> {
        let layout = std::fs::read_to_string(&args.maze)
            .with_context(|| format!("Failed to read maze file {}", args.maze.display()))?;
        let maze = Maze::parse(&layout).context("Failed to load maze")?;

        let controller = match args.agent {
            AgentKind::Policy => {
                let config = match &args.config {
                    Some(path) => load_config(path)?,
                    None => PolicyConfig::default(),
                };
                Controller::Policy(DecisionPolicy::with_config(config, args.seed))
            }
            AgentKind::Random => Controller::Random(RandomAgent::new(args.seed)),
        };

        info!(
            maze = %args.maze.display(),
            agent = controller.name(),
            seed = args.seed,
            "Match starting"
        );

        Ok(App {
            game: Game::new(maze, args.seed),
            controller,
            max_ticks: args.max_ticks,
            last_event: None,
            should_quit: false,
            game_over: false,
        })
    }

    /// Handles one step of the simulation.
    fn tick(&mut self) {
        if self.game_over {
            return;
        }
        let outcome = self.game.process_turn(self.controller.as_agent());
        if outcome != TurnOutcome::Continue {
            self.last_event = Some(outcome);
        }
        if matches!(outcome, TurnOutcome::GameOver | TurnOutcome::LevelCleared)
            || self.game.tick() >= self.max_ticks
        {
            info!(
                tick = self.game.tick(),
                score = self.game.score(),
                ?outcome,
                "Match finished"
            );
            self.game_over = true;
        }
    }

    /// Sets the quit flag.
    fn quit(&mut self) {
        self.should_quit = true;
    }
}

fn load_config(path: &Path) -> Result<PolicyConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn init_tracing(log_file: &Path) -> Result<()> {
    let file = File::create(log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    // Ensure the maze file exists
    if !args.maze.exists() {
        return Err(anyhow::anyhow!(
            "Maze file does not exist: {}",
            args.maze.display()
        ));
    }
    init_tracing(&args.log_file)?;

    // Create the application state
    let mut app = App::new(&args)?;

    if args.headless {
        while !app.game_over {
            app.tick();
        }
        println!(
            "{} finished after {} ticks: score {}, lives {}, pills left {}, outcome {:?}",
            app.controller.name(),
            app.game.tick(),
            app.game.score(),
            app.game.lives(),
            app.game.pills_remaining(),
            app.last_event.unwrap_or(TurnOutcome::Continue)
        );
        return Ok(());
    }

    // Set up the terminal
    let mut terminal = setup_terminal()?;

    // Run the main application loop
    let result = run_app(&mut terminal, &mut app, Duration::from_millis(args.tick_ms));

    // Restore the terminal state
    restore_terminal(&mut terminal)?;

    result
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?; // Put terminal in raw mode
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into) // Map io::Error to anyhow::Error
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Runs the main loop of the TUI application.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        // Draw the UI
        terminal.draw(|f| ui(f, app))?;

        // Calculate timeout for event polling
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        // Poll for events (keyboard, mouse, etc.)
        if crossterm::event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if let KeyCode::Char('q') | KeyCode::Esc = key.code {
                    app.quit();
                }
            }
        }

        // Update application state if enough time has passed
        if last_tick.elapsed() >= tick_rate {
            app.tick(); // Perform simulation step
            last_tick = Instant::now();
        }

        // Exit loop if requested
        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Renders the user interface.
fn ui(frame: &mut Frame, app: &App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Area for the maze
            Constraint::Length(4), // Area for match status
            Constraint::Length(2), // Area for help
        ])
        .split(frame.area());

    render_maze(frame, main_layout[0], app);
    render_status(frame, main_layout[1], app);

    let help_text = Paragraph::new("Press 'q' or 'Esc' to quit.")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(help_text, main_layout[2]);
}

/// Renders score, lives and the controller's current state.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let game = &app.game;
    let event = match (app.game_over, app.last_event) {
        (true, Some(outcome)) => format!("  Finished: {:?}", outcome),
        (true, None) => "  Finished: tick limit".to_string(),
        (false, Some(TurnOutcome::LifeLost)) => "  Life lost!".to_string(),
        _ => String::new(),
    };
    let lines = vec![
        Line::from(format!(
            "Tick: {}  Score: {}  Lives: {}  Pills left: {}{}",
            game.tick(),
            game.score(),
            game.lives(),
            game.pills_remaining(),
            event
        )),
        Line::from(app.controller.status()),
    ];

    let status = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Controller: {}", app.controller.name())),
    );
    frame.render_widget(status, area);
}

const GHOST_COLORS: [Color; GHOST_COUNT] = [
    Color::Red,
    Color::Magenta,
    Color::Cyan,
    Color::LightRed,
];

/// Renders the maze, pills, ghosts and the agent onto the frame.
fn render_maze(frame: &mut Frame, area: Rect, app: &App) {
    let game = &app.game;
    let maze = game.maze();
    let tiles = maze.tiles();
    let agent_position = maze.position(game.current_agent_node());

    let mut lines: Vec<Line> = Vec::with_capacity(tiles.height());
    for y in 0..tiles.height() {
        let mut spans: Vec<Span> = Vec::with_capacity(tiles.width());
        for x in 0..tiles.width() {
            let position = Position { x, y };

            if position == agent_position {
                spans.push(Span::styled("@", Style::default().fg(Color::Yellow).bold()));
                continue;
            }

            let ghost = game
                .ghosts()
                .iter()
                .enumerate()
                .find(|(_, g)| maze.position(g.node) == position);
            if let Some((index, ghost)) = ghost {
                let color = if ghost.is_edible() {
                    Color::Blue
                } else {
                    GHOST_COLORS[index]
                };
                spans.push(Span::styled("G", Style::default().fg(color).bold()));
                continue;
            }

            let span = match (tiles.get(x, y), maze.node_at(position)) {
                (Some(Tile::Wall), _) | (None, _) => {
                    Span::styled("#", Style::default().fg(Color::DarkGray))
                }
                (Some(Tile::Lair), _) => Span::styled("-", Style::default().fg(Color::DarkGray)),
                (_, Some(node)) if game.has_power_pill(node) => {
                    Span::styled("o", Style::default().fg(Color::White).bold())
                }
                (_, Some(node)) if game.has_pill(node) => {
                    Span::styled(".", Style::default().fg(Color::White))
                }
                _ => Span::raw(" "),
            };
            spans.push(span);
        }
        lines.push(Line::from(spans));
    }

    let maze_paragraph = Paragraph::new(lines)
        .block(Block::default().title("Pac-Man Policy").borders(Borders::ALL))
        .alignment(Alignment::Center);

    frame.render_widget(maze_paragraph, area);
}
