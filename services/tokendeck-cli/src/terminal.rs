//! Renders dashboard views as plain text on stdout.

use std::io::{self, BufRead, IsTerminal, Write};
use td_api_types::{Notification, Severity};
use td_dashboard::{AssetListView, BalanceView, ConnectionView, DashboardUi, StatusView};

pub struct TerminalUi {
    /// Answer for the destination prompt, taken from the command line.
    prompt_answer: Option<String>,
    assume_yes: bool,
}

impl TerminalUi {
    pub fn new(prompt_answer: Option<String>, assume_yes: bool) -> Self {
        Self {
            prompt_answer,
            assume_yes,
        }
    }
}

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Success => "ok",
        Severity::Error => "error",
    }
}

pub fn format_connection(view: &ConnectionView) -> Vec<String> {
    match view {
        ConnectionView::Disconnected => vec![format!("Network:  {}", view.network_label())],
        ConnectionView::Connected {
            network,
            account,
            coin_address,
            nft_address,
        } => vec![
            format!("Network:  {network}"),
            format!("Account:  {}", account.to_checksum()),
            format!("Coin:     {}", coin_address.to_checksum()),
            format!("NFT:      {}", nft_address.to_checksum()),
        ],
    }
}

pub fn format_assets(view: &AssetListView) -> Vec<String> {
    let mut lines = Vec::new();
    match view {
        AssetListView::Loading { .. } => lines.push("Scanning for NFTs...".to_owned()),
        AssetListView::Cards(cards) => {
            for card in cards {
                lines.push(card.title.clone());
                lines.push(format!("    {}", card.description));
                lines.push(format!("    image: {}", card.image_url));
                lines.push(format!("    uri:   {}", card.token_uri_display));
            }
        }
        AssetListView::NotConnected | AssetListView::Empty => {}
    }
    if let Some(text) = view.placeholder_text() {
        lines.push(text.to_owned());
    }
    if let Some(label) = view.count_label() {
        lines.push(format!("NFTs:     {label}"));
    }
    lines
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

impl DashboardUi for TerminalUi {
    fn notify(&self, notification: Notification) {
        eprintln!("[{}] {}", severity_tag(notification.severity), notification.message);
    }

    fn render_connection(&self, view: &ConnectionView) {
        print_lines(format_connection(view));
    }

    fn render_balance(&self, view: &BalanceView) {
        println!("Balance:  {}", view.text());
    }

    fn render_assets(&self, view: &AssetListView) {
        print_lines(format_assets(view));
    }

    fn render_status(&self, view: &StatusView) {
        println!("Status:   {}", view.message);
        if let Some(tx) = &view.tx {
            println!("Tx:       {}", tx.hash);
            if let Some(url) = &tx.url {
                println!("Explorer: {url}");
            }
        }
    }

    fn prompt(&self, _message: &str) -> Option<String> {
        self.prompt_answer.clone()
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if !io::stdin().is_terminal() {
            return false;
        }
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}
