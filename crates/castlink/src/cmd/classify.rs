use castlink_station::{is_emergency, matched_keywords};
use serde::Serialize;

use crate::cmd::ClassifyArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat, Record};

#[derive(Serialize)]
struct ClassifyRecord {
    text: String,
    emergency: bool,
    keywords: Vec<&'static str>,
}

impl Record for ClassifyRecord {
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("text", self.text.clone()),
            ("emergency", self.emergency.to_string()),
            ("keywords", self.keywords.join(",")),
        ]
    }
}

pub fn run(args: ClassifyArgs, format: OutputFormat) -> CliResult<i32> {
    let text = args.text.join(" ");
    let record = ClassifyRecord {
        emergency: is_emergency(&text),
        keywords: matched_keywords(&text),
        text,
    };
    print_record(&record, format);
    Ok(SUCCESS)
}
