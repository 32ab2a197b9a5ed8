//! Print the record a generic reference points at.
//!
//! # Usage
//!
//! ```bash
//! shelf-cli resolve store.product 7
//! ```

use shelf_core::ObjectRef;
use shelf_store::Resolver;
use shelf_store::db::registry;

use super::connect;

/// Resolve `target` and print it as JSON.
///
/// # Errors
///
/// Returns an error if the target does not resolve or the database fails.
pub async fn run(target: ObjectRef) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect().await?;
    let resolver = Resolver::new(registry(&pool));

    let entity = resolver.resolve(&target).await?;
    tracing::debug!(%target, verbose_name = entity.verbose_name(), "Resolved reference");

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&entity)?);
    }
    Ok(())
}
