use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Email a sign-in code
    SendOtp { email: String },

    /// Sign in with an emailed code
    VerifyOtp {
        email: String,
        code: String,
        #[arg(long)]
        username: Option<String>,
    },

    /// Create an account; a verification code is emailed
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        display_name: String,
        #[arg(long)]
        profile_photo: Option<String>,
    },

    /// Sign in with email and password
    Login {
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Send a message in the current conversation and stream the reply
    Chat {
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,

        /// Text file whose contents are sent ahead of the message
        #[arg(long)]
        attach: Option<PathBuf>,
    },

    /// Start a new conversation with the next message
    NewChat,

    /// List stored conversations
    History,

    /// Switch to a stored conversation and print it
    Open { id: String },
}
