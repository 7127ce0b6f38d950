use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use recordsql_config::{ConfigProvider, DEFAULT_CONFIG_FILE, DEFAULT_CONNECTION};
use recordsql_core::{
    Record, TableSpec, generate_delete_sql, generate_insert_sql, generate_select_sql,
    generate_update_sql,
};
use recordsql_sqlite::{Database, DbError, QueryResult};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "recordsql")]
#[command(about = "Record CRUD, literal SQL scripts and table creation over named connections")]
#[command(version)]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Connection name from the ConnectionSetting section.
    #[arg(long, global = true, default_value = DEFAULT_CONNECTION)]
    connection: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Execute arbitrary SQL with optional named parameters.
    Exec(ExecArgs),
    /// Select rows matching every condition field.
    Select(SelectArgs),
    /// Insert one row.
    Insert(InsertArgs),
    /// Update rows matching every condition field.
    Update(UpdateArgs),
    /// Delete rows matching every condition field.
    Delete(DeleteArgs),
    /// Print literal SQL without connecting.
    Script(ScriptArgs),
    /// Create a table from a JSON definition or a SQL script file.
    CreateTable(CreateTableArgs),
}

#[derive(Debug, Args)]
struct ExecArgs {
    /// SQL text; `:name` placeholders bind to --param values.
    #[arg(long)]
    sql: String,
    /// Named parameter as NAME=VALUE (repeatable).
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,
    /// Return only the first row of a read.
    #[arg(long)]
    fetch_one: bool,
}

#[derive(Debug, Args)]
struct SelectArgs {
    #[arg(long)]
    table: String,
    /// Condition field as NAME=VALUE (repeatable).
    #[arg(long = "where", value_name = "NAME=VALUE")]
    conditions: Vec<String>,
    /// Print only the first matching row, or null.
    #[arg(long)]
    one: bool,
}

#[derive(Debug, Args)]
struct InsertArgs {
    #[arg(long)]
    table: String,
    /// Field to insert as NAME=VALUE (repeatable).
    #[arg(long = "set", value_name = "NAME=VALUE", required = true)]
    fields: Vec<String>,
    /// Print the literal SQL instead of executing.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct UpdateArgs {
    #[arg(long)]
    table: String,
    /// Field to assign as NAME=VALUE (repeatable).
    #[arg(long = "set", value_name = "NAME=VALUE", required = true)]
    fields: Vec<String>,
    /// Condition field as NAME=VALUE (repeatable).
    #[arg(long = "where", value_name = "NAME=VALUE")]
    conditions: Vec<String>,
    /// Print the literal SQL instead of executing.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    #[arg(long)]
    table: String,
    /// Condition field as NAME=VALUE (repeatable).
    #[arg(long = "where", value_name = "NAME=VALUE")]
    conditions: Vec<String>,
    /// Print the literal SQL instead of executing.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Debug, Args)]
struct ScriptArgs {
    #[command(subcommand)]
    statement: ScriptStatement,
}

#[derive(Debug, Subcommand)]
enum ScriptStatement {
    /// INSERT with inline literals.
    Insert {
        #[arg(long)]
        table: String,
        #[arg(long = "set", value_name = "NAME=VALUE", required = true)]
        fields: Vec<String>,
    },
    /// UPDATE with inline literals.
    Update {
        #[arg(long)]
        table: String,
        #[arg(long = "set", value_name = "NAME=VALUE", required = true)]
        fields: Vec<String>,
        #[arg(long = "where", value_name = "NAME=VALUE")]
        conditions: Vec<String>,
    },
    /// DELETE with inline literals, terminated by `;`.
    Delete {
        #[arg(long)]
        table: String,
        #[arg(long = "where", value_name = "NAME=VALUE")]
        conditions: Vec<String>,
    },
    /// SELECT with inline literals.
    Select {
        #[arg(long)]
        table: String,
        #[arg(long = "where", value_name = "NAME=VALUE")]
        conditions: Vec<String>,
    },
    /// CREATE TABLE text for a JSON table definition.
    Create {
        /// JSON file holding a table definition or a script string.
        #[arg(long)]
        spec: PathBuf,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct CreateTableSource {
    /// JSON file holding a table definition (or a JSON string script).
    #[arg(long)]
    spec: Option<PathBuf>,
    /// SQL file executed verbatim.
    #[arg(long)]
    script: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CreateTableArgs {
    #[command(flatten)]
    source: CreateTableSource,
    /// Print the SQL instead of executing.
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let target = Target {
        config: cli.config,
        connection: cli.connection,
    };

    let result = match cli.command {
        Command::Exec(args) => run_exec(&target, args),
        Command::Select(args) => run_select(&target, args),
        Command::Insert(args) => run_insert(&target, args),
        Command::Update(args) => run_update(&target, args),
        Command::Delete(args) => run_delete(&target, args),
        Command::Script(args) => run_script(args),
        Command::CreateTable(args) => run_create_table(&target, args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Logs to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

/// Where database commands connect.
struct Target {
    config: PathBuf,
    connection: String,
}

impl Target {
    fn open(&self) -> Result<Database, String> {
        debug!(config = %self.config.display(), connection = %self.connection, "connecting");
        let provider = ConfigProvider::new(&self.config);
        Database::connect(&provider, &self.connection).map_err(|e| {
            format!(
                "Failed to resolve connection '{}' from '{}': {e}",
                self.connection,
                self.config.display()
            )
        })
    }
}

fn parse_record(assignments: &[String]) -> Result<Record, String> {
    Record::from_assignments(assignments).map_err(|e| e.to_string())
}

/// `None` when no condition was given, so a select reads the whole table.
fn parse_condition(assignments: &[String]) -> Result<Option<Record>, String> {
    if assignments.is_empty() {
        Ok(None)
    } else {
        parse_record(assignments).map(Some)
    }
}

fn describe(err: DbError) -> String {
    if err.is_warning() {
        format!("refused: {err}")
    } else {
        err.to_string()
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), String> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| format!("Failed to encode JSON: {e}"))?;
    println!("{text}");
    Ok(())
}

fn print_affected(affected: usize) {
    println!("{affected} row(s) affected.");
}

fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {e}", path.display()))
}

fn load_table_spec(path: &Path) -> Result<TableSpec, String> {
    let text = read_file(path)?;
    let json: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse table spec '{}': {e}", path.display()))?;
    TableSpec::from_json(json).map_err(|e| e.to_string())
}

fn run_exec(target: &Target, args: ExecArgs) -> Result<(), String> {
    let params = parse_record(&args.params)?;
    let db = target.open()?;
    let result = db
        .execute(&args.sql, Some(&params), args.fetch_one)
        .map_err(describe)?;
    match result {
        QueryResult::Rows(rows) => print_json(&rows),
        QueryResult::Row(row) => print_json(&row),
        QueryResult::Affected(n) => {
            print_affected(n);
            Ok(())
        }
    }
}

fn run_select(target: &Target, args: SelectArgs) -> Result<(), String> {
    let condition = parse_condition(&args.conditions)?;
    let db = target.open()?;
    if args.one {
        let row = db
            .select_one(&args.table, condition.as_ref())
            .map_err(describe)?;
        print_json(&row)
    } else {
        let rows = db
            .select(&args.table, condition.as_ref())
            .map_err(describe)?;
        print_json(&rows)
    }
}

fn run_insert(target: &Target, args: InsertArgs) -> Result<(), String> {
    let record = parse_record(&args.fields)?;
    if args.dry_run {
        println!(
            "{}",
            generate_insert_sql(&args.table, &record).map_err(|e| e.to_string())?
        );
        return Ok(());
    }
    let affected = target
        .open()?
        .insert(&args.table, &record)
        .map_err(describe)?;
    print_affected(affected);
    Ok(())
}

fn run_update(target: &Target, args: UpdateArgs) -> Result<(), String> {
    let record = parse_record(&args.fields)?;
    let condition = parse_record(&args.conditions)?;
    if args.dry_run {
        println!(
            "{}",
            generate_update_sql(&args.table, &record, &condition).map_err(|e| e.to_string())?
        );
        return Ok(());
    }
    let affected = target
        .open()?
        .update(&args.table, &record, &condition)
        .map_err(describe)?;
    print_affected(affected);
    Ok(())
}

fn run_delete(target: &Target, args: DeleteArgs) -> Result<(), String> {
    let condition = parse_record(&args.conditions)?;
    if args.dry_run {
        println!(
            "{}",
            generate_delete_sql(&args.table, &condition).map_err(|e| e.to_string())?
        );
        return Ok(());
    }
    let affected = target
        .open()?
        .delete(&args.table, &condition)
        .map_err(describe)?;
    print_affected(affected);
    Ok(())
}

fn run_script(args: ScriptArgs) -> Result<(), String> {
    let sql = match args.statement {
        ScriptStatement::Insert { table, fields } => {
            generate_insert_sql(&table, &parse_record(&fields)?)
        }
        ScriptStatement::Update {
            table,
            fields,
            conditions,
        } => generate_update_sql(&table, &parse_record(&fields)?, &parse_record(&conditions)?),
        ScriptStatement::Delete { table, conditions } => {
            generate_delete_sql(&table, &parse_record(&conditions)?)
        }
        ScriptStatement::Select { table, conditions } => Ok(generate_select_sql(
            &table,
            parse_condition(&conditions)?.as_ref(),
        )),
        ScriptStatement::Create { spec } => load_table_spec(&spec)?.to_sql(),
    }
    .map_err(|e| e.to_string())?;
    println!("{sql}");
    Ok(())
}

fn run_create_table(target: &Target, args: CreateTableArgs) -> Result<(), String> {
    let spec = match (args.source.spec, args.source.script) {
        (Some(path), _) => load_table_spec(&path)?,
        (None, Some(path)) => TableSpec::Script(read_file(&path)?),
        (None, None) => return Err("either --spec or --script is required".to_string()),
    };
    if args.dry_run {
        println!("{}", spec.to_sql().map_err(|e| e.to_string())?);
        return Ok(());
    }
    target.open()?.create_table(&spec).map_err(describe)?;
    match &spec {
        TableSpec::Definition(table) => println!("Table '{}' created.", table.name),
        TableSpec::Script(_) => println!("Table script executed."),
    }
    Ok(())
}
