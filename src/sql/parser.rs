//! SQL Parser
//!
//! This module parses tokens into a [`Command`]. The grammar is fixed and
//! narrow on purpose; anything outside it is a syntax error for the
//! statement kind named by the leading keywords.

use super::ast::*;
use super::lexer::Lexer;
use super::token::{Keyword, Token};
use crate::catalog::DataType;
use crate::error::{Error, Result};

/// Parse one request line into a command.
///
/// Never fails: lines whose prefix is not one of the six statements map to
/// [`Command::Unsupported`], and lines that start right but do not match the
/// grammar map to [`Command::Invalid`].
pub fn parse_command(sql: &str) -> Command {
    let Some(kind) = StatementKind::detect(sql) else {
        return Command::Unsupported;
    };

    match Parser::new(sql).and_then(|mut p| p.parse()) {
        Ok(command) => command,
        Err(_) => Command::Invalid(kind),
    }
}

/// SQL Parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a SQL string
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse a single statement, which must span the whole input
    pub fn parse(&mut self) -> Result<Command> {
        let command = self.parse_statement()?;

        // Consume optional semicolon
        if self.check(&Token::Semicolon) {
            self.advance();
        }

        if !self.is_at_end() {
            return Err(Error::UnexpectedToken {
                expected: "end of statement".to_string(),
                found: format!("{}", self.current()),
            });
        }

        Ok(command)
    }

    /// Parse a single statement
    fn parse_statement(&mut self) -> Result<Command> {
        match self.current().keyword() {
            Some(Keyword::Create) => self.parse_create_table().map(Command::CreateTable),
            Some(Keyword::Drop) => self.parse_drop_table().map(Command::DropTable),
            Some(Keyword::Insert) => self.parse_insert().map(Command::Insert),
            Some(Keyword::Select) => self.parse_select().map(Command::Select),
            Some(Keyword::Delete) => self.parse_delete().map(Command::Delete),
            Some(Keyword::Update) => self.parse_update().map(Command::Update),
            _ => Err(Error::UnexpectedToken {
                expected: "CREATE, DROP, INSERT, SELECT, DELETE or UPDATE".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }

    // ========== CREATE / DROP ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect_keyword(Keyword::Create)?;
        self.expect_keyword(Keyword::Table)?;

        let table_name = self.expect_name()?;

        self.expect(&Token::LParen)?;

        // At least one column, then the trailing PRIMARY KEY clause
        let mut columns: Vec<ColumnDef> = Vec::new();
        loop {
            let at_primary_key = self.check_keyword(Keyword::Primary)
                && self.peek().is_some_and(|t| t.is_keyword(Keyword::Key));
            if at_primary_key && !columns.is_empty() {
                break;
            }

            let column = self.parse_column_def()?;
            if columns.iter().any(|c| c.name == column.name) {
                return Err(Error::UnexpectedToken {
                    expected: "distinct column names".to_string(),
                    found: column.name,
                });
            }
            columns.push(column);
            self.expect(&Token::Comma)?;
        }

        self.expect_keyword(Keyword::Primary)?;
        self.expect_keyword(Keyword::Key)?;
        self.expect(&Token::LParen)?;
        let primary_key = self.expect_name()?;
        self.expect(&Token::RParen)?;

        self.expect(&Token::RParen)?;

        Ok(CreateTableStatement {
            table_name,
            columns,
            primary_key,
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_name()?;
        let data_type = self.parse_data_type()?;

        Ok(ColumnDef { name, data_type })
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        let dt = match self.current().keyword() {
            Some(Keyword::Int) => DataType::Int,
            Some(Keyword::Text) => DataType::Text,
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: "data type".to_string(),
                    found: format!("{}", self.current()),
                });
            }
        };
        self.advance();

        Ok(dt)
    }

    fn parse_drop_table(&mut self) -> Result<DropTableStatement> {
        self.expect_keyword(Keyword::Drop)?;
        self.expect_keyword(Keyword::Table)?;

        let table_name = self.expect_name()?;

        Ok(DropTableStatement { table_name })
    }

    // ========== INSERT Statement ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect_keyword(Keyword::Insert)?;
        self.expect_keyword(Keyword::Into)?;

        let table_name = self.expect_name()?;

        self.expect(&Token::LParen)?;
        let columns = self.parse_name_list()?;
        self.expect(&Token::RParen)?;

        self.expect_keyword(Keyword::Values)?;

        self.expect(&Token::LParen)?;
        let values = self.parse_value_list()?;
        self.expect(&Token::RParen)?;

        Ok(InsertStatement {
            table_name,
            columns,
            values,
        })
    }

    // ========== SELECT Statement ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect_keyword(Keyword::Select)?;
        self.expect(&Token::Asterisk)?;
        self.expect_keyword(Keyword::From)?;

        let table_name = self.expect_name()?;
        let predicate = self.parse_optional_where()?;

        Ok(SelectStatement {
            table_name,
            predicate,
        })
    }

    // ========== DELETE Statement ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect_keyword(Keyword::Delete)?;
        self.expect_keyword(Keyword::From)?;

        let table_name = self.expect_name()?;
        let predicate = self.parse_optional_where()?;

        Ok(DeleteStatement {
            table_name,
            predicate,
        })
    }

    // ========== UPDATE Statement ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect_keyword(Keyword::Update)?;

        let table_name = self.expect_name()?;

        self.expect_keyword(Keyword::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_name()?;
            self.expect(&Token::Eq)?;
            let value = self.expect_value()?;
            assignments.push(Assignment { column, value });

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect_keyword(Keyword::Where)?;
        let predicate = self.parse_predicate()?;

        Ok(UpdateStatement {
            table_name,
            assignments,
            predicate,
        })
    }

    // ========== Predicates ==========

    fn parse_optional_where(&mut self) -> Result<Option<Predicate>> {
        if !self.check_keyword(Keyword::Where) {
            return Ok(None);
        }
        self.advance();

        self.parse_predicate().map(Some)
    }

    fn parse_predicate(&mut self) -> Result<Predicate> {
        let column = self.expect_name()?;
        self.expect(&Token::Eq)?;
        let value = self.expect_value()?;

        Ok(Predicate { column, value })
    }

    // ========== Helper functions ==========

    fn parse_name_list(&mut self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        loop {
            names.push(self.expect_name()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(names)
    }

    fn parse_value_list(&mut self) -> Result<Vec<String>> {
        let mut values = Vec::new();

        loop {
            values.push(self.expect_value()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(values)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position + 1)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.current().is_keyword(keyword)
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(Error::UnexpectedToken {
                expected: format!("{}", token),
                found: format!("{}", self.current()),
            })
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> Result<()> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(Error::UnexpectedToken {
                expected: keyword.to_string(),
                found: format!("{}", self.current()),
            })
        }
    }

    /// Table or column name: a bare word of word characters only
    fn expect_name(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Word(name) if name.chars().all(|c| c.is_alphanumeric() || c == '_') => {
                self.advance();
                Ok(name)
            }
            _ => Err(Error::UnexpectedToken {
                expected: "name".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }

    /// Bare word or quoted string; quotes are already stripped by the lexer
    fn expect_value(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Word(value) | Token::StringLiteral(value) => {
                self.advance();
                Ok(value)
            }
            _ => Err(Error::UnexpectedToken {
                expected: "value".to_string(),
                found: format!("{}", self.current()),
            }),
        }
    }
}
