mod cli;
mod client;
mod models;
mod render;
mod repl;
mod session;

use client::HTTPClient;
use repl::REPL;
use session::Session;

fn main() {
    let config = cli::parse_config();
    let client = HTTPClient::new(&config.base_url, config.token.clone());
    let session = Session::new(config, client);
    let mut repl = REPL::new(session);
    repl.run();
}
