//! Builds the inlined form of a single call

use crate::analysis::{
    assigned_variables, contains_function_definition, referenced_variables, SideEffects,
};
use rustc_hash::FxHashMap;
use yul_core::ast::{
    Block, Expression, FunctionCall, FunctionDefinition, Name, Statement, TypedName,
};
use yul_core::visitor::{walk_expression_mut, walk_statement_mut, VisitorMut};
use yul_core::{yul_assert, Dialect, NameDispenser, Result};

/// Result of rewriting one call.
///
/// `prologue` binds the arguments that need a variable of their own and
/// declares the fresh return variables; it must run before `body`. The
/// call's value is read from `return_variables` afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct InlinedCall {
    pub prologue: Vec<Statement>,
    pub body: Block,
    pub return_variables: Vec<Name>,
}

impl InlinedCall {
    /// Prologue followed by the body as a nested block
    pub fn into_statements(self) -> Vec<Statement> {
        let mut statements = self.prologue;
        statements.push(Statement::Block(self.body));
        statements
    }
}

pub struct CallSiteRewriter<'a, 'd> {
    dialect: &'a Dialect,
    dispenser: &'d mut NameDispenser,
}

impl<'a, 'd> CallSiteRewriter<'a, 'd> {
    pub fn new(dialect: &'a Dialect, dispenser: &'d mut NameDispenser) -> Self {
        Self { dialect, dispenser }
    }

    /// Copy `function`'s body for `call`.
    ///
    /// Every parameter is either substituted by its argument (literals and
    /// identifiers, when the body never assigns the parameter), dropped (an
    /// unused parameter whose argument is movable) or bound to a fresh
    /// variable, in argument order. All variables of the copy get fresh names.
    pub fn rewrite(&mut self, call: &FunctionCall, function: &FunctionDefinition) -> Result<InlinedCall> {
        yul_assert!(
            call.function_name == function.name,
            "call to {} rewritten with the body of {}",
            call.function_name,
            function.name
        );
        yul_assert!(
            call.arguments.len() == function.parameters.len(),
            "call to {} has {} arguments, expected {}",
            function.name,
            call.arguments.len(),
            function.parameters.len()
        );
        yul_assert!(
            !contains_function_definition(&function.body),
            "function {} contains a nested function definition",
            function.name
        );

        let side_effects = SideEffects::new(self.dialect);
        let assigned = assigned_variables(&function.body);
        let referenced = referenced_variables(&function.body);

        let mut substitutions: FxHashMap<Name, Expression> = FxHashMap::default();
        let mut prologue = Vec::new();

        for (parameter, argument) in function.parameters.iter().zip(&call.arguments) {
            let is_assigned = assigned.contains(&parameter.name);
            let is_used = is_assigned || referenced.contains_key(&parameter.name);
            if !is_used && side_effects.is_movable(argument) {
                continue;
            }
            let is_trivial = matches!(argument, Expression::Literal(_) | Expression::Identifier(_));
            if is_used && is_trivial && !is_assigned {
                substitutions.insert(parameter.name.clone(), argument.clone());
                continue;
            }
            let fresh = self.dispenser.new_name(&parameter.name);
            prologue.push(Statement::declare(
                vec![TypedName {
                    name: fresh.clone(),
                    type_name: parameter.type_name.clone(),
                }],
                Some(argument.clone()),
            ));
            substitutions.insert(parameter.name.clone(), Expression::identifier(fresh));
        }

        let mut return_variables = Vec::with_capacity(function.return_variables.len());
        for variable in &function.return_variables {
            let fresh = self.dispenser.new_name(&variable.name);
            let zero = self.dialect.zero_literal(variable.type_name.as_deref());
            prologue.push(Statement::declare(
                vec![TypedName {
                    name: fresh.clone(),
                    type_name: variable.type_name.clone(),
                }],
                Some(Expression::Literal(zero)),
            ));
            substitutions.insert(variable.name.clone(), Expression::identifier(fresh.clone()));
            return_variables.push(fresh);
        }

        let mut body = function.body.clone();
        let mut copier = BodyCopier {
            dispenser: &mut *self.dispenser,
            substitutions,
            invalid_target: None,
        };
        copier.visit_block_mut(&mut body);
        if let Some(target) = copier.invalid_target {
            yul_assert!(
                false,
                "assignment to {} in {} cannot target its substituted argument",
                target,
                function.name
            );
        }

        Ok(InlinedCall {
            prologue,
            body,
            return_variables,
        })
    }
}

/// Renames the declarations of a body copy and rewrites every reference
struct BodyCopier<'d> {
    dispenser: &'d mut NameDispenser,
    substitutions: FxHashMap<Name, Expression>,
    invalid_target: Option<Name>,
}

impl BodyCopier<'_> {
    fn rename_target(&mut self, name: &mut Name) {
        match self.substitutions.get(name.as_str()) {
            Some(Expression::Identifier(fresh)) => *name = fresh.clone(),
            Some(_) => self.invalid_target = Some(name.clone()),
            None => {}
        }
    }
}

impl VisitorMut for BodyCopier<'_> {
    fn visit_statement_mut(&mut self, statement: &mut Statement) {
        match statement {
            Statement::VariableDeclaration { variables, value } => {
                // The value is evaluated before the new names come into scope.
                if let Some(value) = value {
                    self.visit_expression_mut(value);
                }
                for variable in variables {
                    let fresh = self.dispenser.new_name(&variable.name);
                    self.substitutions
                        .insert(variable.name.clone(), Expression::identifier(fresh.clone()));
                    variable.name = fresh;
                }
            }
            Statement::Assignment {
                variable_names,
                value,
            } => {
                self.visit_expression_mut(value);
                for name in variable_names {
                    self.rename_target(name);
                }
            }
            _ => walk_statement_mut(self, statement),
        }
    }

    fn visit_expression_mut(&mut self, expression: &mut Expression) {
        if let Expression::Identifier(name) = expression {
            if let Some(replacement) = self.substitutions.get(name.as_str()) {
                *expression = replacement.clone();
            }
            return;
        }
        walk_expression_mut(self, expression);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use yul_core::ast::Block;
    use yul_parser::{parse_block, parse_expression};

    fn rewrite(source: &str, call: &str) -> Result<(InlinedCall, Block)> {
        let dialect = Dialect::evm();
        let block = parse_block(source).unwrap();
        let call = match parse_expression(call).unwrap() {
            Expression::FunctionCall(call) => call,
            other => panic!("not a call: {:?}", other),
        };
        let function = block
            .functions()
            .find(|f| f.name == call.function_name)
            .unwrap()
            .clone();
        let mut dispenser = NameDispenser::for_block(&dialect, &block);
        let inlined = CallSiteRewriter::new(&dialect, &mut dispenser).rewrite(&call, &function)?;
        let printed = Block::new(inlined.clone().into_statements());
        Ok((inlined, printed))
    }

    #[test]
    fn test_trivial_arguments_are_substituted() {
        let (inlined, block) = rewrite(
            "{ function f(a, b) -> r { r := add(a, b) } }",
            "f(x, 7)",
        )
        .unwrap();
        assert_eq!(inlined.return_variables, vec!["r_1".to_string()]);
        assert_eq!(
            block.to_string(),
            "{\n    let r_1 := 0\n    {\n        r_1 := add(x, 7)\n    }\n}"
        );
    }

    #[test]
    fn test_effectful_arguments_are_bound_in_order() {
        let (_, block) = rewrite(
            "{ function f(a, b, c) -> r { r := c } }",
            "f(mload(0), add(1, 2), sload(1))",
        )
        .unwrap();
        // `b` is unused and its argument movable, so it is dropped; `a` is
        // unused but its argument reads memory, so it is still evaluated.
        assert_eq!(
            block.to_string(),
            "{\n    let a_1 := mload(0)\n    let c_2 := sload(1)\n    let r_3 := 0\n    {\n        r_3 := c_2\n    }\n}"
        );
    }

    #[test]
    fn test_assigned_parameter_gets_a_copy() {
        let (_, block) = rewrite("{ function f(a) { a := add(a, 1) sstore(0, a) } }", "f(5)").unwrap();
        assert_eq!(
            block.to_string(),
            "{\n    let a_1 := 5\n    {\n        a_1 := add(a_1, 1)\n        sstore(0, a_1)\n    }\n}"
        );
    }

    #[test]
    fn test_locals_are_renamed() {
        let (inlined, _) = rewrite(
            "{ function f() -> r { let t := 1 for { let i := 0 } lt(i, t) { i := add(i, 1) } { r := i } } }",
            "f()",
        )
        .unwrap();
        let printed = inlined.body.to_string();
        assert!(printed.contains("let t_2 := 1"));
        assert!(printed.contains("let i_3 := 0"));
        assert!(printed.contains("r_1 := i_3"));
        assert!(!printed.contains(" t "));
    }

    #[test]
    fn test_arity_mismatch_is_internal_error() {
        let error = rewrite("{ function f(a) {} }", "f(1, 2)").unwrap_err();
        assert!(error.is_internal());
    }

    #[test]
    fn test_nested_definition_is_internal_error() {
        let error = rewrite("{ function f() { function g() {} } }", "f()").unwrap_err();
        assert!(error.is_internal());
    }
}
