use dotenvy::dotenv;
use std::{
    error::Error,
    io::{self, Write},
};
use tracing_subscriber::EnvFilter;
use video_tutor::{export, SessionEvent, SessionState, Tutor, TutorConfig, Variant};

// Usage: cargo run --example terminal [gate-passphrase]
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut config = TutorConfig::from_env();
    if let Some(passphrase) = std::env::args().nth(1) {
        config = config.gate_passphrase(passphrase);
    }

    let gate = config.gate();
    if gate.requires_passphrase() && !gate.check(&read_line("Passphrase: ")?) {
        println!("Incorrect passphrase.");
        return Ok(());
    }

    let mut tutor = config.build_tutor()?;
    print_help();
    print_initial(&tutor);

    loop {
        let input = read_line(&format!("[{}] > ", tutor.session().variant()))?;
        let (command, arg) = input.split_once(' ').unwrap_or((input.as_str(), ""));

        match command {
            "" => {}
            "/quit" | "exit" => break,
            "/help" => print_help(),
            "/app" => match arg.trim().parse::<usize>() {
                Ok(n) if (1..=Variant::ALL.len()).contains(&n) => {
                    tutor.dispatch(SessionEvent::SelectVariant(Variant::ALL[n - 1]));
                    print_initial(&tutor);
                }
                _ => println!("Choose an application between 1 and {}.", Variant::ALL.len()),
            },
            "/example" => {
                let examples = tutor.session().example_prompts();
                match arg.trim().parse::<usize>() {
                    Ok(n) if (1..=examples.len()).contains(&n) => {
                        let prompt = examples[n - 1];
                        tutor.dispatch(SessionEvent::SetPromptText(prompt.to_string()));
                        println!("Prompt: {prompt}");
                        println!("Send it with /ask, or type your own question.");
                    }
                    _ => println!("Choose an example between 1 and {}.", examples.len()),
                }
            }
            "/ask" => submit(&mut tutor).await,
            "/history" => {
                if tutor.history().is_empty() {
                    println!("No history yet.");
                }
                for (index, item) in tutor.history().iter().enumerate() {
                    println!("{:>3}. [{}] {}", index + 1, item.variant(), item.prompt());
                }
            }
            "/open" => {
                let item = arg
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|index| tutor.history().items().get(index).cloned());
                match item {
                    Some(item) => {
                        tutor.dispatch(SessionEvent::SelectHistoryItem(item));
                        print_state(&tutor);
                    }
                    None => println!("No such history item."),
                }
            }
            "/clear" => {
                tutor.dispatch(SessionEvent::ClearHistory);
                println!("History cleared.");
            }
            "/export" => match tutor.session().current_tutorial() {
                Some(tutorial) => {
                    let document = export::export(tutorial, tutor.session().variant());
                    let path = if arg.trim().is_empty() {
                        document.file_name().to_string()
                    } else {
                        arg.trim().to_string()
                    };
                    std::fs::write(&path, document.to_pdf()?)?;
                    println!("Saved {} page(s) to {path}", document.pages().len());
                }
                None => println!("Nothing to export yet."),
            },
            _ => {
                tutor.dispatch(SessionEvent::SetPromptText(input.clone()));
                submit(&mut tutor).await;
            }
        }
    }

    Ok(())
}

async fn submit(tutor: &mut Tutor) {
    tutor.dispatch(SessionEvent::Submit);
    if tutor.session().is_loading() {
        println!("Generating your tutorial...");
    }
    tutor.settle().await;
    print_state(tutor);
}

fn print_state(tutor: &Tutor) {
    let session = tutor.session();
    if let Some(message) = session.last_error() {
        println!("{message}");
    }
    if let SessionState::Success { tutorial, .. } = session.state() {
        println!("\n{}\n", tutorial.title());
        for (index, step) in tutorial.steps().iter().enumerate() {
            println!("Step {}: {step}\n", index + 1);
        }
    }
}

fn print_initial(tutor: &Tutor) {
    let variant = tutor.session().variant();
    println!("\n{variant} tutor. Ask a question, or try an example:");
    for (index, prompt) in tutor.session().example_prompts().iter().enumerate() {
        println!("  /example {}  {prompt}", index + 1);
    }
}

fn print_help() {
    println!("Commands:");
    for (index, variant) in Variant::ALL.iter().enumerate() {
        println!("  /app {}        switch to {variant}", index + 1);
    }
    println!("  /example <n>  fill the prompt with an example question");
    println!("  /ask          send the current prompt");
    println!("  /history      list past tutorials");
    println!("  /open <n>     show a past tutorial");
    println!("  /clear        clear the history");
    println!("  /export [f]   save the current tutorial");
    println!("  /quit         exit");
}

fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok("/quit".to_string());
    }
    Ok(input.trim().to_string())
}
