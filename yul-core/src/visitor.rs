//! Visitor pattern infrastructure for AST traversal
//!
//! Every `visit_*` method has a default that recurses through the matching
//! `walk_*` function, so implementors override only the nodes they care
//! about and call the walker to keep descending. Call arguments are visited
//! left to right before the call itself is considered finished.

use crate::ast::{Block, Case, Expression, FunctionCall, FunctionDefinition, Literal, Statement};

/// Read-only traversal
pub trait Visitor {
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_statement(&mut self, statement: &Statement) {
        walk_statement(self, statement);
    }

    fn visit_function_definition(&mut self, function: &FunctionDefinition) {
        self.visit_block(&function.body);
    }

    fn visit_expression(&mut self, expression: &Expression) {
        walk_expression(self, expression);
    }

    fn visit_function_call(&mut self, call: &FunctionCall) {
        for argument in &call.arguments {
            self.visit_expression(argument);
        }
    }

    fn visit_identifier(&mut self, _name: &str) {}

    fn visit_literal(&mut self, _literal: &Literal) {}
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    for statement in &block.statements {
        visitor.visit_statement(statement);
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(visitor: &mut V, statement: &Statement) {
    match statement {
        Statement::ExpressionStatement(expression) => visitor.visit_expression(expression),
        Statement::Assignment { value, .. } => visitor.visit_expression(value),
        Statement::VariableDeclaration { value, .. } => {
            if let Some(value) = value {
                visitor.visit_expression(value);
            }
        }
        Statement::FunctionDefinition(function) => visitor.visit_function_definition(function),
        Statement::If { condition, body } => {
            visitor.visit_expression(condition);
            visitor.visit_block(body);
        }
        Statement::Switch { expression, cases } => {
            visitor.visit_expression(expression);
            for Case { body, .. } in cases {
                visitor.visit_block(body);
            }
        }
        Statement::ForLoop {
            pre,
            condition,
            post,
            body,
        } => {
            visitor.visit_block(pre);
            visitor.visit_expression(condition);
            visitor.visit_block(body);
            visitor.visit_block(post);
        }
        Statement::Block(block) => visitor.visit_block(block),
        Statement::Break | Statement::Continue | Statement::Leave => {}
    }
}

pub fn walk_expression<V: Visitor + ?Sized>(visitor: &mut V, expression: &Expression) {
    match expression {
        Expression::FunctionCall(call) => visitor.visit_function_call(call),
        Expression::Identifier(name) => visitor.visit_identifier(name),
        Expression::Literal(literal) => visitor.visit_literal(literal),
    }
}

/// Mutating traversal
pub trait VisitorMut {
    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_statement_mut(&mut self, statement: &mut Statement) {
        walk_statement_mut(self, statement);
    }

    fn visit_function_definition_mut(&mut self, function: &mut FunctionDefinition) {
        self.visit_block_mut(&mut function.body);
    }

    fn visit_expression_mut(&mut self, expression: &mut Expression) {
        walk_expression_mut(self, expression);
    }

    fn visit_function_call_mut(&mut self, call: &mut FunctionCall) {
        for argument in &mut call.arguments {
            self.visit_expression_mut(argument);
        }
    }

    fn visit_identifier_mut(&mut self, _name: &mut String) {}
}

pub fn walk_block_mut<V: VisitorMut + ?Sized>(visitor: &mut V, block: &mut Block) {
    for statement in &mut block.statements {
        visitor.visit_statement_mut(statement);
    }
}

pub fn walk_statement_mut<V: VisitorMut + ?Sized>(visitor: &mut V, statement: &mut Statement) {
    match statement {
        Statement::ExpressionStatement(expression) => visitor.visit_expression_mut(expression),
        Statement::Assignment { value, .. } => visitor.visit_expression_mut(value),
        Statement::VariableDeclaration { value, .. } => {
            if let Some(value) = value {
                visitor.visit_expression_mut(value);
            }
        }
        Statement::FunctionDefinition(function) => visitor.visit_function_definition_mut(function),
        Statement::If { condition, body } => {
            visitor.visit_expression_mut(condition);
            visitor.visit_block_mut(body);
        }
        Statement::Switch { expression, cases } => {
            visitor.visit_expression_mut(expression);
            for case in cases {
                visitor.visit_block_mut(&mut case.body);
            }
        }
        Statement::ForLoop {
            pre,
            condition,
            post,
            body,
        } => {
            visitor.visit_block_mut(pre);
            visitor.visit_expression_mut(condition);
            visitor.visit_block_mut(body);
            visitor.visit_block_mut(post);
        }
        Statement::Block(block) => visitor.visit_block_mut(block),
        Statement::Break | Statement::Continue | Statement::Leave => {}
    }
}

pub fn walk_expression_mut<V: VisitorMut + ?Sized>(visitor: &mut V, expression: &mut Expression) {
    match expression {
        Expression::FunctionCall(call) => visitor.visit_function_call_mut(call),
        Expression::Identifier(name) => visitor.visit_identifier_mut(name),
        Expression::Literal(_) => {}
    }
}
