use crate::ingest::schema::TableSchema;

/// One-shot example of the schema layout the model should produce.
pub const SAMPLE_SCHEMA: &str = "
Table Name: employees
Columns:
- id: INTEGER
- name: TEXT
- salary: FLOAT
- department: TEXT
";

/// Role, schema, question, output instruction. In that order.
pub fn build_sql_prompt(schema: &str, question: &str) -> String {
    format!(
        "You are a SQL expert. Given the following table schema:\n\
         {schema}\n\n\
         Convert this natural language query into a SQL query:\n\
         {question}\n\n\
         Please provide only the SQL query without any explanations."
    )
}

pub fn build_schema_prompt(table: &TableSchema) -> String {
    format!(
        "Based on the data in `{}`, the columns are {} and the datatypes are {}. \
         Create a schema for the data. It should look like this: {}",
        table.name,
        table.column_list(),
        table.type_map(),
        SAMPLE_SCHEMA
    )
}
