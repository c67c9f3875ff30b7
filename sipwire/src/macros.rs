macro_rules! comma_separated {
    ($parser:ident => $body:expr) => {{
        $parser.lws();
        $body;
        $parser.lws();

        while let Some(b',') = $parser.consume(b",") {
            $parser.lws();
            $body;
            $parser.lws();
        }
    }};
}

macro_rules! parse_error {
    ($message:expr) => {
        Err($crate::error::GrammarFault::new($message))
    };
    ($message:expr, $parser:expr) => {
        Err($crate::error::GrammarFault::new(format!(
            "{} (column {})",
            $message,
            $parser.position().col()
        )))
    };
}

pub(crate) use comma_separated;
pub(crate) use parse_error;
