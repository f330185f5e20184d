/// Builds [`Arguments`](crate::Arguments) from `name => value` pairs.
///
/// ```rust
/// use kestrel::k_args;
///
/// let arguments = k_args! {
///     "history" => "",
///     "human_input" => "What's 2+2?",
/// };
///
/// assert_eq!(arguments.text("human_input").as_deref(), Some("What's 2+2?"));
/// ```
#[macro_export]
macro_rules! k_args {
    () => {
        $crate::Arguments::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {
        $crate::Arguments::new()$(.with($name, $value))+
    };
}

/// Creates a [`SessionRequest`](crate::SessionRequest) with platform shorthand support.
///
/// ```rust
/// use kestrel::{PlatformSelector, Purpose, k_request};
///
/// let request = k_request!(neuchar, "jeffrey", "gpt-4o", image);
/// assert_eq!(request.platform, PlatformSelector::NeuCharOpenAi);
/// assert_eq!(request.purpose, Purpose::Image);
/// ```
#[macro_export]
macro_rules! k_request {
    ($platform:ident, $user:expr, $model:expr $(,)?) => {
        $crate::k_request!($platform, $user, $model, completion)
    };
    ($platform:ident, $user:expr, $model:expr, $purpose:ident $(,)?) => {
        $crate::SessionRequest::new($crate::k_request!(@platform $platform), $user, $model)
            .purpose($crate::k_request!(@purpose $purpose))
    };
    (@platform openai) => { $crate::PlatformSelector::OpenAi };
    (@platform azure) => { $crate::PlatformSelector::AzureOpenAi };
    (@platform neuchar) => { $crate::PlatformSelector::NeuCharOpenAi };
    (@platform huggingface) => { $crate::PlatformSelector::HuggingFace };
    (@platform ollama) => { $crate::PlatformSelector::Ollama };
    (@purpose completion) => { $crate::Purpose::Completion };
    (@purpose embedding) => { $crate::Purpose::Embedding };
    (@purpose image) => { $crate::Purpose::Image };
}
