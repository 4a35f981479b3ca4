// cli/mod.rs — subcommands of the `arend-completion` binary

pub mod complete;
