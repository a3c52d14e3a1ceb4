use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromptError {
    /// Manual history pushes would record every line twice while the prompt
    /// already adds committed lines on its own.
    #[error(
        "external pushes to the history are forbidden while automatic history is enabled; \
         build the prompt with `disable_auto_history()`"
    )]
    ExternalHistoryPushForbidden,
    #[error("terminal: {0}")]
    Terminal(#[from] anyhow::Error),
    #[error("runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
