use crate::core::catalog::MODEL_CATALOG;
use crate::core::config::Config;

/// Print the model catalog, marking the configured default with `*`.
pub fn list_models(config: &Config) {
    println!("Available models:");
    println!();
    for model in MODEL_CATALOG {
        let marker = if config.default_model.as_deref() == Some(model.id) {
            "*"
        } else {
            " "
        };
        println!(
            "  {marker} {:<14} {:<14} {}",
            model.id, model.display_name, model.description
        );
    }
    println!();
    println!("Any other model id is passed to the provider unchanged (use -m/--model).");
}
