use shortcut_engine::plan::{self, GeneratedStep};
use shortcut_engine::platform;
use shortcut_engine::{
    ActivationTiming, ApplicationTarget, ExecutionSession, ExecutionSettings, LoggingObserver, ShortcutEngine,
    SpeedPreset,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

async fn prompt() {
    print!("> ");
    let _ = io::stdout().flush().await;
}

fn print_help() {
    println!("Available commands:");
    println!("  add <instruction> [| description]  - Queue a step (e.g. add ⌘ c | Copy)");
    println!("  load <file>                        - Queue steps from generated JSON");
    println!("  list                               - Show queued steps");
    println!("  clear                              - Empty the queue");
    println!("  speed <slow|normal|fast>           - Pick a speed preset");
    println!("  save                               - Save current settings");
    println!("  apps                               - List running applications");
    println!("  grant                              - Request Accessibility permission");
    println!("  run [previous app]                 - Run the queue (Ctrl-C cancels)");
    println!("  quit                               - Exit (Ctrl-C at the prompt also exits)");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging();

    let settings = match ExecutionSettings::resolve() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("Settings unusable, falling back to defaults: {}", e);
            ExecutionSettings::default()
        }
    };
    tracing::info!(?settings, "shortcut engine starting");

    let mut engine = ShortcutEngine::new(platform::default_backends(), settings, ActivationTiming::default());
    let mut queue: Vec<GeneratedStep> = Vec::new();

    println!("⌨️  Shortcut Engine Started!");
    println!("--------------------------------------------------");
    println!("Type 'help' for commands. (Needs Accessibility Permissions)");
    println!("--------------------------------------------------");
    if !engine.has_input_permission() {
        println!("⚠️  Accessibility permission not granted yet. Use 'grant'.");
    }

    let mut reader = io::BufReader::new(io::stdin());
    let mut buffer = String::new();
    prompt().await;

    loop {
        // Ctrl-C cancels a run in flight; at the prompt it exits
        let read = tokio::select! {
            read = reader.read_line(&mut buffer) => read?,
            _ = tokio::signal::ctrl_c() => {
                println!("\n👋 Bye");
                break;
            }
        };
        if read == 0 {
            break;
        }
        let input = buffer.trim().to_string();
        buffer.clear();

        if input.is_empty() {
            prompt().await;
            continue;
        }

        let (cmd, rest) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input.as_str(), ""),
        };

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "add" => {
                if rest.is_empty() {
                    println!("Usage: add <instruction> [| description]");
                } else {
                    let (instruction, description) = match rest.split_once(" | ") {
                        Some((i, d)) => (i.trim(), d.trim()),
                        None => (rest, ""),
                    };
                    let name = format!("step {}", queue.len() + 1);
                    queue.push(GeneratedStep::new(name, instruction, description));
                    println!("➕ Queued ({} total)", queue.len());
                }
            }
            "load" => {
                if rest.is_empty() {
                    println!("Usage: load <file>");
                } else {
                    match tokio::fs::read_to_string(rest).await {
                        Ok(raw) => match plan::decode_generated_steps(&raw) {
                            Ok(steps) => {
                                println!("📥 Loaded {} step(s)", steps.len());
                                queue.extend(steps);
                            }
                            Err(e) => println!("❌ Could not decode steps: {}", e),
                        },
                        Err(e) => println!("❌ Could not read {}: {}", rest, e),
                    }
                }
            }
            "list" => {
                if queue.is_empty() {
                    println!("(queue is empty)");
                }
                let actions = plan::build_actions(&queue);
                println!("{} step(s), {} runnable action(s)", queue.len(), actions.len());
                for (i, action) in actions.iter().enumerate() {
                    println!("  {}. {}  [{}]", i + 1, action.description, action.kind);
                }
            }
            "clear" => {
                queue.clear();
                println!("🧹 Queue cleared");
            }
            "speed" => match rest.parse::<SpeedPreset>() {
                Ok(speed) => {
                    engine.set_settings(ExecutionSettings::preset(speed));
                    println!("⏱️  Speed set to {:?}", speed);
                }
                Err(e) => println!("❌ {}", e),
            },
            "save" => match ExecutionSettings::default_path() {
                Some(path) => match engine.settings().save(&path) {
                    Ok(()) => println!("💾 Saved to {}", path.display()),
                    Err(e) => println!("❌ {}", e),
                },
                None => println!("❌ No configuration directory on this system"),
            },
            "apps" => match engine.running_applications().await {
                Ok(apps) => {
                    for app in apps {
                        let bundle = app.bundle_id.as_deref().unwrap_or("-");
                        let hidden = if app.hidden { " (hidden)" } else { "" };
                        println!("  {:>6}  {}  {}{}", app.pid, app.name, bundle, hidden);
                    }
                }
                Err(e) => println!("❌ {}", e),
            },
            "grant" => {
                if engine.request_permission() {
                    println!("✅ Accessibility permission granted");
                } else {
                    println!("⛔️ Permission not granted. Enable it in System Settings, then retry.");
                }
            }
            "run" => {
                if queue.is_empty() {
                    println!("Nothing queued. Use 'add' or 'load' first.");
                } else {
                    let previous = (!rest.is_empty()).then(|| ApplicationTarget::named(rest));
                    let session = ExecutionSession::new();
                    let outcome = {
                        let run = engine.execute(&queue, previous.as_ref(), &session, &LoggingObserver);
                        tokio::pin!(run);

                        tokio::select! {
                            outcome = &mut run => outcome,
                            _ = tokio::signal::ctrl_c() => {
                                println!("\n🛑 Cancelling...");
                                session.cancel();
                                run.await
                            }
                        }
                    };

                    if outcome.success() {
                        println!("✅ {}", outcome.message);
                        queue.clear();
                    } else {
                        println!("❌ {} ({} action(s) executed)", outcome.message, outcome.executed);
                    }
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }

        prompt().await;
    }

    Ok(())
}
