//! Banners printed at the start and end of an install

use console::style;

pub fn print_welcome() {
    println!();
    println!(
        "  {}",
        style("Welcome! Let's install some instrumentation.").bold()
    );
    println!();
    println!("  Questions? Read more about the installation process at");
    println!("  https://docs.newrelic.com/");
    println!();
}

pub fn print_success(account_id: u64) {
    println!();
    println!(
        "  {}",
        style("Success! Your data is available.").green().bold()
    );
    println!();
    println!("  Go to the launcher to confirm and start exploring your data.");
    println!("  {}", launcher_url(account_id));
    println!();
}

fn launcher_url(account_id: u64) -> String {
    format!("https://one.newrelic.com/launcher/nrai.launcher?platform[accountId]={account_id}")
}
