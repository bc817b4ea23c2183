use clap::{Arg, Command};

pub const CMD_HASH_PASSWORD: &str = "hash-password";
pub const ARG_PASSWORD: &str = "password";

/// `hash-password` prints a bcrypt hash for seeding the `admins` table.
#[must_use]
pub fn with_subcommand(command: Command) -> Command {
    command.subcommand(
        Command::new(CMD_HASH_PASSWORD)
            .about("Print a bcrypt hash for an admin password (reads stdin when --password is omitted)")
            .arg(
                Arg::new(ARG_PASSWORD)
                    .long(ARG_PASSWORD)
                    .help("Password to hash; prefer stdin so it stays out of shell history")
                    .env("STOREFRONT_ADMIN_PASSWORD")
                    .hide_env_values(true),
            ),
    )
}
