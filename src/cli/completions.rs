use clap::Parser;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    instafork completions bash > ~/.bash_completion.d/instafork\n\n\
                  Generate zsh completions:\n    instafork completions zsh > ~/.zfunc/_instafork\n\n\
                  Generate fish completions:\n    instafork completions fish > ~/.config/fish/completions/instafork.fish")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}
