mod info;
mod listen;
mod send;

use clap::{Args, Subcommand};

use crate::exit::CliResult;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Join the export stream and print control updates.
    Listen(ListenArgs),
    /// Send one command to the simulator.
    Send(SendArgs),
    /// Print protocol defaults and version.
    Info,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Multicast group (or unicast address) of the export stream.
    #[arg(long, value_name = "ADDR", default_value = "")]
    pub group: String,

    /// Local port of the export stream.
    #[arg(long, value_name = "PORT", default_value_t = 0)]
    pub port: u16,

    /// Stop after printing this many updates.
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,

    /// Print raw datagrams instead of decoded updates.
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Command text, e.g. "FLAPS_SWITCH INC". A trailing newline is added
    /// if missing.
    pub text: String,

    /// Command target address.
    #[arg(long, value_name = "ADDR", default_value = "")]
    pub target: String,

    /// Command target port.
    #[arg(long, value_name = "PORT", default_value_t = 0)]
    pub port: u16,
}

pub fn run(command: Command) -> CliResult<i32> {
    match command {
        Command::Listen(args) => listen::run(args),
        Command::Send(args) => send::run(args),
        Command::Info => info::run(),
    }
}
