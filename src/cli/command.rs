use clap::Subcommand;

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    #[command(
        about = "Register the schema and insert missing default documents (default)",
        long_about = "Register every collection and its unique indexes, then insert each default record that is not already present. Running it again is a no-op."
    )]
    Seed,
    #[command(
        about = "Show document counts per collection",
        long_about = "Register the schema if needed and print how many documents each registered collection holds."
    )]
    Status,
    #[command(
        about = "Print the collection schema",
        long_about = "Print every collection the seeder registers together with its unique indexes, in dependency order."
    )]
    Schema,
}
