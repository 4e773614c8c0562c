//! Line-oriented console hosting the controls panel and the preview player.

mod command;
mod session;

pub use command::{parse_input, ConsoleCommand, HELP_TEXT};
pub use session::{
    print_prompt, print_status, ConsoleObserver, ConsoleSession, Step, PLAYER_POLL_INTERVAL,
};
