use serde::Serialize;
use std::collections::HashMap;
use tabled::{Table, Tabled};

pub enum OutputWriter {
    /// Display results in a human-readable table
    Table(TableOutputWriter),
    /// Display results as JSON
    Json(JsonOutputWriter),
}

impl OutputWriter {
    pub fn write_list<T: Serialize + Tabled>(
        &self,
        items: &[T],
        out: &mut dyn std::io::Write,
    ) -> anyhow::Result<()> {
        match self {
            OutputWriter::Table(writer) => writer.write_list(items, out),
            OutputWriter::Json(writer) => writer.write_list(items, out),
        }
    }

    /// Render a queue-name keyed map, sorted by queue name so output is
    /// stable across runs.
    pub fn write_detail<V: Serialize + Clone>(
        &self,
        detail: &HashMap<String, V>,
        out: &mut dyn std::io::Write,
    ) -> anyhow::Result<()> {
        match self {
            OutputWriter::Table(_) => {
                let mut names: Vec<&String> = detail.keys().collect();
                names.sort();
                for name in names {
                    writeln!(out, "{}: {}", name, serde_json::to_string(&detail[name])?)?;
                }
                Ok(())
            }
            OutputWriter::Json(_) => {
                let json = serde_json::to_string_pretty(detail)?;
                writeln!(out, "{}", json)?;
                Ok(())
            }
        }
    }
}

pub struct TableOutputWriter;
impl TableOutputWriter {
    pub fn write_list<T: Serialize + Tabled>(
        &self,
        items: &[T],
        out: &mut dyn std::io::Write,
    ) -> anyhow::Result<()> {
        let table = Table::new(items);
        writeln!(out, "{}", table)?;
        Ok(())
    }
}

pub struct JsonOutputWriter;
impl JsonOutputWriter {
    pub fn write_list<T: Serialize>(
        &self,
        items: &[T],
        out: &mut dyn std::io::Write,
    ) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        writeln!(out, "{}", json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonOutputWriter, OutputWriter, TableOutputWriter};
    use crate::types::{Message, QueueDepth};
    use std::collections::HashMap;

    fn sample_messages() -> Vec<Message> {
        vec![Message::with_priority("m-1", 5, r#"{"a":"b"}"#)]
    }

    #[test]
    fn test_json_writer() {
        let writer = OutputWriter::Json(JsonOutputWriter);
        let mut cursor = std::io::Cursor::new(Vec::new());
        writer.write_list(&sample_messages(), &mut cursor).unwrap();
        let output = String::from_utf8(cursor.into_inner()).unwrap();
        assert!(output.contains("m-1"));
        assert!(output.contains("priority"));
    }

    #[test]
    fn test_table_writer() {
        let writer = OutputWriter::Table(TableOutputWriter);
        let mut cursor = std::io::Cursor::new(Vec::new());
        let depths = vec![QueueDepth {
            queue_name: "task_queue".to_string(),
            size: 3,
        }];
        writer.write_list(&depths, &mut cursor).unwrap();
        let output = String::from_utf8(cursor.into_inner()).unwrap();

        assert!(output.contains("queue_name"), "Should contain column header");
        assert!(output.contains("task_queue"), "Should contain the queue name");
        assert!(output.contains("| "), "Should contain table border characters");
    }

    #[test]
    fn test_detail_output_is_sorted() {
        let writer = OutputWriter::Table(TableOutputWriter);
        let mut cursor = std::io::Cursor::new(Vec::new());
        let detail: HashMap<String, i64> =
            HashMap::from([("b_queue".to_string(), 2), ("a_queue".to_string(), 1)]);
        writer.write_detail(&detail, &mut cursor).unwrap();
        let output = String::from_utf8(cursor.into_inner()).unwrap();
        let a = output.find("a_queue").unwrap();
        let b = output.find("b_queue").unwrap();
        assert!(a < b, "queues should print in name order");
    }
}
