use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use nutricoach::auth::{self, AuthSession};
use nutricoach::catalog::{self, Catalog, NewFood};
use nutricoach::chat::{self, Conversation, Role};
use nutricoach::config::ClientConfig;
use nutricoach::goals::{GoalTracker, Preset};
use nutricoach::meals::{self, Cart};
use nutricoach::{parse_iso_date, CoreError, HttpBackend, NutritionBackend};

const HELP: &str = "\
commands:
  login <email> <password>      register <email> <password>     logout
  search [term]                 add <result#>                   estimate <food name>
  newfood name|serving|cal|protein|carbs|fat
  cart                          qty <cart#> <amount>            rm <cart#>
  log [YYYY-MM-DD]
  goals [load]                  set <calories|protein|carbs|fat> <value>
  preset <loss|maintenance|gain>                                savegoals
  summary [YYYY-MM-DD]
  chat <message>                history                         clear
  health                        help                            quit";

struct App {
    backend: HttpBackend,
    auth: AuthSession,
    catalog: Catalog,
    cart: Cart,
    goals: GoalTracker,
    chat: Conversation,
}

/// Prefixes remote failures the way the user sees them; auth failures point
/// back at `login`.
fn report(action: &str, err: &CoreError) {
    match err {
        CoreError::Auth(_) => println!("{err}. Use `login` to sign in again."),
        _ => println!("Error {action}: {err}"),
    }
}

fn number(v: &str) -> Option<f64> {
    v.parse().ok().filter(|n: &f64| n.is_finite())
}

fn parse_index(arg: Option<&str>, len: usize) -> Option<usize> {
    let n: usize = arg?.parse().ok()?;
    (1..=len).contains(&n).then(|| n - 1)
}

impl App {
    fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let backend = HttpBackend::new(config).context("building http client")?;
        let auth = config
            .token
            .clone()
            .map(AuthSession::with_token)
            .unwrap_or_default();
        Ok(Self {
            backend,
            auth,
            catalog: Catalog::default(),
            cart: Cart::default(),
            goals: GoalTracker::default(),
            chat: Conversation::default(),
        })
    }

    /// Returns `false` when the user asked to quit.
    async fn handle(&mut self, line: &str) -> bool {
        let line = line.trim();
        let (cmd, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        match cmd {
            "" => {}
            "help" => println!("{HELP}"),
            "quit" | "exit" => return false,
            "login" | "register" => self.authenticate(cmd, &args).await,
            "logout" => {
                self.auth.logout();
                println!("Logged out.");
            }
            "health" => match self.backend.health().await {
                Ok(h) => println!("API {} ({})", h.status, h.version.unwrap_or_default()),
                Err(e) => report("checking API", &e),
            },
            "search" => self.search(rest).await,
            "add" => match parse_index(args.first().copied(), self.catalog.results().len()) {
                Some(i) => {
                    let item = self.catalog.results()[i].clone();
                    println!("Added {}.", item.name);
                    self.cart.add_item(item);
                }
                None => println!("Pick a result number from the last search."),
            },
            "qty" | "rm" => self.edit_cart(cmd, &args),
            "cart" => self.show_cart(),
            "log" => self.log_meal(args.first().copied()).await,
            "newfood" => self.new_food(rest).await,
            "estimate" => match catalog::estimate_food(&self.backend, &self.auth, rest).await {
                Ok(v) => println!("{}", serde_json::to_string_pretty(&v).unwrap_or_default()),
                Err(e) => report("estimating food", &e),
            },
            "goals" => {
                if args.first() == Some(&"load") {
                    if let Err(e) = self.goals.load(&self.backend, &self.auth).await {
                        report("loading goals", &e);
                    }
                }
                self.show_goals();
            }
            "set" => self.set_goal(&args),
            "preset" => match Preset::parse(rest) {
                Some(p) => {
                    self.goals.apply_preset(p);
                    println!("Applied {} preset (not saved yet).", p.label());
                    self.show_goals();
                }
                None => println!("Unknown preset. Try loss, maintenance or gain."),
            },
            "savegoals" => match self.goals.update(&self.backend, &self.auth).await {
                Ok(()) => println!("Goals updated successfully!"),
                Err(e) => report("updating goals", &e),
            },
            "summary" => self.summary(args.first().copied()).await,
            "chat" => self.chat(rest).await,
            "history" => self.show_history(),
            "clear" => {
                self.chat.clear();
                println!("Chat cleared.");
            }
            other => println!("Unknown command `{other}`. Type `help`."),
        }
        true
    }

    async fn authenticate(&mut self, cmd: &str, args: &[&str]) {
        let [email, password] = args else {
            println!("usage: {cmd} <email> <password>");
            return;
        };
        let outcome = if cmd == "login" {
            auth::login(&mut self.auth, &self.backend, email, password).await
        } else {
            auth::register(&mut self.auth, &self.backend, email, password).await
        };
        match outcome {
            Ok(()) => {
                println!("Signed in as {email}.");
                if let Err(e) = self.goals.load(&self.backend, &self.auth).await {
                    report("loading goals", &e);
                }
            }
            Err(e) => println!("{e}"),
        }
    }

    async fn search(&mut self, term: &str) {
        match self.catalog.search(&self.backend, &self.auth, term).await {
            Ok(items) if items.is_empty() => println!("No foods found."),
            Ok(items) => {
                for (i, f) in items.iter().enumerate() {
                    println!(
                        "{:>3}. {} ({}) {} cal | {}g protein | {}g carbs | {}g fat",
                        i + 1,
                        f.name,
                        f.serving_desc,
                        f.cal,
                        f.protein,
                        f.carbs,
                        f.fat
                    );
                }
            }
            Err(e) => report("searching foods", &e),
        }
    }

    fn edit_cart(&mut self, cmd: &str, args: &[&str]) {
        let Some(i) = parse_index(args.first().copied(), self.cart.entries().len()) else {
            println!("Pick an entry number from `cart`.");
            return;
        };
        let id = self.cart.entries()[i].item.id;
        let quantity = if cmd == "rm" {
            0.0
        } else {
            match args.get(1).and_then(|q| number(q)) {
                Some(q) => q,
                None => {
                    println!("usage: qty <cart#> <amount>");
                    return;
                }
            }
        };
        self.cart.update_quantity(id, quantity);
        self.show_cart();
    }

    fn show_cart(&self) {
        if self.cart.is_empty() {
            println!("No foods selected. Search and add foods to log a meal.");
            return;
        }
        for (i, e) in self.cart.entries().iter().enumerate() {
            let m = e.macros();
            println!(
                "{:>3}. {} x{} = {:.0} cal | {:.1}g protein",
                i + 1,
                e.item.name,
                e.quantity,
                m.calories,
                m.protein
            );
        }
        let t = self.cart.totals();
        println!(
            "Total: {:.0} cal | {:.1}g protein | {:.1}g carbs | {:.1}g fat",
            t.calories, t.protein, t.carbs, t.fat
        );
    }

    async fn log_meal(&mut self, date: Option<&str>) {
        let date = match date.map(parse_iso_date) {
            Some(None) => {
                println!("Dates look like 2024-03-05.");
                return;
            }
            Some(d) => d,
            None => None,
        };
        match meals::submit_meal(&mut self.cart, &self.backend, &self.auth, date).await {
            Ok(_) => {
                println!("Meal logged successfully!");
                self.summary(None).await;
            }
            Err(CoreError::Validation(msg)) => println!("{msg}"),
            Err(e) => report("logging meal", &e),
        }
    }

    async fn new_food(&mut self, spec: &str) {
        let parts: Vec<&str> = spec.split('|').map(str::trim).collect();
        let [name, serving, cal, protein, carbs, fat] = parts.as_slice() else {
            println!("usage: newfood name|serving|cal|protein|carbs|fat");
            return;
        };
        let (Some(cal), Some(protein), Some(carbs), Some(fat)) =
            (number(cal), number(protein), number(carbs), number(fat))
        else {
            println!("Nutrition values must be numbers.");
            return;
        };
        let food = NewFood {
            name: name.to_string(),
            serving_desc: serving.to_string(),
            cal,
            protein,
            carbs,
            fat,
            provenance: "user".into(),
        };
        match catalog::create_food(&self.backend, &self.auth, food).await {
            Ok(created) => println!(
                "{}",
                created.message.unwrap_or_else(|| "Food added.".into())
            ),
            Err(e) => report("adding food", &e),
        }
    }

    fn show_goals(&self) {
        let g = self.goals.goals();
        println!(
            "Goals: {} cal | {}g protein | {}g carbs | {}g fat{}",
            g.calories,
            g.protein_g,
            g.carbs_g,
            g.fat_g,
            if self.goals.is_loaded() { "" } else { " (defaults)" }
        );
    }

    fn set_goal(&mut self, args: &[&str]) {
        let (Some(field), Some(value)) = (args.first(), args.get(1).and_then(|v| number(v))) else {
            println!("usage: set <calories|protein|carbs|fat> <value>");
            return;
        };
        let mut g = *self.goals.goals();
        match *field {
            "calories" | "cal" => g.calories = value,
            "protein" => g.protein_g = value,
            "carbs" => g.carbs_g = value,
            "fat" => g.fat_g = value,
            other => {
                println!("Unknown goal `{other}`.");
                return;
            }
        }
        match self.goals.set(g) {
            Ok(()) => self.show_goals(),
            Err(e) => println!("{e}"),
        }
    }

    async fn summary(&mut self, date: Option<&str>) {
        let date = match date.map(parse_iso_date) {
            Some(None) => {
                println!("Dates look like 2024-03-05.");
                return;
            }
            Some(d) => d,
            None => None,
        };
        let summary = match self.goals.refresh_summary(&self.backend, &self.auth, date).await {
            Ok(s) => s.clone(),
            Err(e) => return report("loading summary", &e),
        };
        let board = self.goals.dashboard(&summary);
        println!("Summary for {}", summary.date);
        for (label, p) in [
            ("Calories", board.calories),
            ("Protein ", board.protein),
            ("Carbs   ", board.carbs),
            ("Fat     ", board.fat),
        ] {
            println!("  {label} {:>7.0} / {:<7.0} {:>5.1}%", p.current, p.target, p.percent);
        }
    }

    async fn chat(&mut self, text: &str) {
        let acted = match chat::send_message(&mut self.chat, &self.backend, &self.auth, text).await {
            Ok(Some(turn)) => {
                println!("coach> {}", turn.content);
                if !turn.actions.is_empty() {
                    println!("Actions taken:");
                    for a in &turn.actions {
                        println!("  - {a}");
                    }
                }
                !turn.actions.is_empty()
            }
            Ok(None) => false,
            Err(e) => {
                println!("{e}");
                false
            }
        };
        // the coach may have changed today's totals
        if acted {
            self.summary(None).await;
        }
    }

    fn show_history(&self) {
        if self.chat.turns().is_empty() {
            println!("No messages yet. Try \"Log 2 eggs and 1 slice of toast\".");
        }
        for t in self.chat.turns() {
            let who = match t.role {
                Role::User => "you",
                Role::Assistant if t.is_error => "coach!",
                Role::Assistant => "coach",
            };
            println!("{who}> {}", t.content);
            for a in &t.actions {
                println!("    - {a}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "nutricoach=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = ClientConfig::from_env()?;
    tracing::info!(base_url = %config.base_url, "starting");
    let mut app = App::new(&config)?;

    println!("Nutrition coach. Type `help` for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !app.handle(&line).await {
            break;
        }
    }
    Ok(())
}
