use std::io::{self, BufRead, Write};
use std::sync::Arc;

use chat_widget::{
    ChatController, ContentSpan, HttpCompletionConfig, HttpCompletionGateway, Role, content_spans,
};
use tracing::error;

/// Terminal harness for the chat widget controller. Stands in for the page
/// that mounts the widget: drives submit/select/toggle against a live
/// completion endpoint configured through the environment.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "widget_demo=info,chat_widget=debug".to_string()),
        )
        .init();

    let config = match HttpCompletionConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("failed to read config: {err}");
            std::process::exit(1);
        }
    };

    let gateway = match HttpCompletionGateway::new(config) {
        Ok(gateway) => gateway,
        Err(err) => {
            error!("failed to build completion gateway: {err}");
            std::process::exit(1);
        }
    };

    let mut controller = ChatController::new(Arc::new(gateway));
    controller.toggle_open();
    render_latest(&controller);
    println!("(type a message, or /quit to exit; suggestions can be typed back verbatim)");

    let stdin = io::stdin();
    loop {
        prompt();
        let Some(Ok(line)) = stdin.lock().lines().next() else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }

        // A typed suggestion behaves like clicking its chip.
        if controller
            .turns()
            .last()
            .is_some_and(|turn| turn.suggestions.iter().any(|s| s == line.trim()))
        {
            controller.select_suggestion(line.trim());
        } else {
            controller.set_draft(line);
        }

        if controller.submit().await.is_err() {
            continue;
        }
        render_latest(&controller);
        controller.drain_effects();
    }
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn render_latest(controller: &ChatController) {
    let Some(turn) = controller
        .turns()
        .iter()
        .rev()
        .find(|turn| turn.role == Role::Assistant)
    else {
        return;
    };

    let mut rendered = String::new();
    for span in content_spans(&turn.content) {
        match span {
            ContentSpan::Text(text) => rendered.push_str(&text),
            ContentSpan::Link(link) => {
                rendered.push('[');
                rendered.push_str(&link);
                rendered.push(']');
            }
        }
    }
    println!("aletheia: {rendered}");

    for suggestion in &turn.suggestions {
        println!("  * {suggestion}");
    }
}
