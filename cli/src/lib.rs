mod docs_nav;

pub use docs_nav::ChangeArg;
pub use docs_nav::DocnavCli;
pub use docs_nav::DocnavCommand;
pub use docs_nav::FlattenCommand;
pub use docs_nav::OutputFormat;
pub use docs_nav::RefsCommand;
pub use docs_nav::SearchCommand;
pub use docs_nav::SearchMode;
pub use docs_nav::TechnologiesCommand;
pub use docs_nav::run;
