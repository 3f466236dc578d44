use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    instrumentor completions bash > ~/.bash_completion.d/instrumentor\n\n\
                  Generate zsh completions:\n    instrumentor completions zsh > ~/.zfunc/_instrumentor\n\n\
                  Generate fish completions:\n    instrumentor completions fish > ~/.config/fish/completions/instrumentor.fish\n\n\
                  Generate PowerShell completions:\n    instrumentor completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
