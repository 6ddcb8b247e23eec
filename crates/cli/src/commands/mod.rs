pub mod init;
pub mod list;
pub mod materialize;
pub mod run;
pub mod util;

pub use init::*;
pub use list::*;
pub use materialize::*;
pub use run::*;
pub use util::*;
