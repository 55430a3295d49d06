use crate::backends::target::TargetWriter;
use crate::backends::target::target_expr::TargetExpr;

#[derive(Clone, Debug, PartialEq)]
pub enum TargetStatement {
    Declaration {
        name: String,
        // None emits `var`, which needs an initializer
        type_name: Option<String>,
        initializer: Option<TargetExpr>,
    },
    Assignment {
        target: TargetExpr,
        value: TargetExpr,
    },
    Expression(TargetExpr),
    Return(Option<TargetExpr>),
    LocalFunction {
        name: String,
        return_type: String,
        body: Vec<TargetStatement>,
    },
    // A member that could not be converted is kept in the output as a marker
    ErrorMarker {
        member: String,
        message: String,
    },
}

impl TargetStatement {
    pub fn declaration(
        name: impl Into<String>,
        type_name: Option<String>,
        initializer: Option<TargetExpr>,
    ) -> Self {
        TargetStatement::Declaration {
            name: name.into(),
            type_name,
            initializer,
        }
    }

    pub fn assignment(target: TargetExpr, value: TargetExpr) -> Self {
        TargetStatement::Assignment { target, value }
    }
}

impl TargetWriter {
    pub fn write_statement(&mut self, statement: &TargetStatement) {
        match statement {
            TargetStatement::Declaration {
                name,
                type_name,
                initializer,
            } => {
                let type_name = type_name.as_deref().unwrap_or("var");
                match initializer {
                    Some(initializer) => {
                        self.emit_line(&format!("{type_name} {name} = {initializer};"))
                    }
                    None => self.emit_line(&format!("{type_name} {name};")),
                }
            }

            TargetStatement::Assignment { target, value } => {
                self.emit_line(&format!("{target} = {value};"));
            }

            TargetStatement::Expression(expr) => self.emit_line(&format!("{expr};")),

            TargetStatement::Return(Some(value)) => self.emit_line(&format!("return {value};")),
            TargetStatement::Return(None) => self.emit_line("return;"),

            TargetStatement::LocalFunction {
                name,
                return_type,
                body,
            } => {
                self.emit_line(&format!("{return_type} {name}()"));
                self.emit_line("{");
                self.with_indent(|writer| {
                    for statement in body {
                        writer.write_statement(statement);
                    }
                });
                self.emit_line("}");
            }

            TargetStatement::ErrorMarker { member, message } => {
                let message = message.replace("*/", "* /");
                self.emit_line(&format!("/* Cannot convert {member}: {message} */"));
            }
        }
    }
}
