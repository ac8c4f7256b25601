//! Policy command - print the default policy.

use tighten::PolicyConfig;

pub fn run(flat: bool) -> Result<(), Box<dyn std::error::Error>> {
    let policy = PolicyConfig::default_policy();
    if flat {
        for (key, value) in policy.to_flat_map() {
            println!("{} = {}", key, value);
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&policy)?);
    }
    Ok(())
}
