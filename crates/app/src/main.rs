//! livechat - terminal client for a live chat room
//!
//! Connects to a relay, binds a chat view to the connection and drives it
//! from standard input.

use std::io::Write;
use std::rc::Rc;

use anyhow::Context;
use clap::Parser;
use livechat_core::{ChatView, Key};
use livechat_net::SocketChannel;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod input;
mod render;

use config::{Cli, Config};
use input::Command;

fn main() {
    // Logs go to stderr so the chat window owns stdout
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match Config::resolve(Cli::parse()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to create tokio runtime");

    if let Err(e) = runtime.block_on(run(config)) {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!(server = %config.server, room = %config.room, username = %config.username, "Starting livechat");

    let stream = TcpStream::connect(&config.server)
        .await
        .with_context(|| format!("Failed to connect to {}", config.server))?;
    let (channel, mut inbox) = SocketChannel::attach(stream);
    let channel = Rc::new(channel);

    let mut view = ChatView::new(channel.clone(), config.username, config.room);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut out = std::io::stdout();

    render::draw(&view, &mut out, true)?;
    loop {
        let mut notice = None;

        tokio::select! {
            event = inbox.next_event() => match event {
                Some(event) => {
                    channel.deliver(&event);
                }
                None => {
                    warn!("Connection closed by relay");
                    break;
                }
            },
            line = lines.next_line() => match line.context("Failed to read input")? {
                Some(line) => match input::parse_line(&line) {
                    Command::Say(text) => {
                        view.update_draft(text);
                        view.handle_key(Key::Enter);
                    }
                    Command::Delete(id) => {
                        if let Err(e) = view.request_delete(id) {
                            notice = Some(e.to_string());
                        }
                    }
                    Command::Quit => break,
                    Command::Unknown(line) => {
                        notice = Some(format!("Unknown command: {}", line));
                    }
                },
                None => break,
            },
        }

        render::draw(&view, &mut out, true)?;
        if let Some(notice) = notice {
            write!(out, "\n! {}\n> ", notice)?;
            out.flush()?;
        }
    }

    view.unmount();
    writeln!(out)?;
    info!("Left chat");
    Ok(())
}
