//! Call-site traversal and inlining decisions

use super::eligibility::InlineEligibility;
use super::guard::GrowthGuard;
use super::rewriter::{CallSiteRewriter, InlinedCall};
use crate::analysis::{statement_contains_function_definition, ReferencesCounter, SideEffects};
use crate::cost::{CostEstimator, TransitiveCost};
use crate::settings::InlinerSettings;
use crate::size::Size;
use crate::stats::{InlinerStats, SkipReason};
use anyhow::Result;
use log::{debug, trace};
use rustc_hash::FxHashMap;
use std::rc::Rc;
use yul_core::ast::{
    Block, Case, Expression, FunctionCall, FunctionDefinition, Name, Statement, TypedName,
};
use yul_core::{yul_assert, Dialect, NameDispenser};

/// One run of the full inliner over one block of hoisted code.
///
/// The block is walked once, left to right and depth first. Arguments are
/// visited before the call they belong to, so nested calls are decided
/// innermost first. The body copy produced for an inlined call is walked
/// before it is spliced in, with the callee pushed onto the inline chain;
/// every other call node is decided exactly once.
pub struct InlinerDriver<'a> {
    dialect: &'a Dialect,
    settings: &'a InlinerSettings,
    estimator: CostEstimator<'a>,
    side_effects: SideEffects<'a>,
    dispenser: &'a mut NameDispenser,
    /// Function definitions as they were before the run
    functions: FxHashMap<Name, Rc<FunctionDefinition>>,
    eligible: FxHashMap<Name, bool>,
    /// Live number of calls per function in the code
    call_counts: FxHashMap<Name, usize>,
    transitive: TransitiveCost,
    guard: GrowthGuard,
    stats: InlinerStats,
}

impl<'a> InlinerDriver<'a> {
    /// Requires every function definition at the top level of `code` and
    /// unique function names.
    pub fn new(
        dialect: &'a Dialect,
        settings: &'a InlinerSettings,
        estimator: CostEstimator<'a>,
        eligibility: &dyn InlineEligibility,
        dispenser: &'a mut NameDispenser,
        code: &Block,
    ) -> Result<Self> {
        let mut functions = FxHashMap::default();
        let mut eligible = FxHashMap::default();
        for statement in &code.statements {
            match statement {
                Statement::FunctionDefinition(function) => {
                    yul_assert!(
                        !function.body.statements.iter().any(statement_contains_function_definition),
                        "function {} contains a nested function definition; hoist functions before inlining",
                        function.name
                    );
                    eligible.insert(function.name.clone(), eligibility.is_eligible(function));
                    let previous = functions.insert(function.name.clone(), Rc::new(function.clone()));
                    yul_assert!(
                        previous.is_none(),
                        "function {} is defined more than once",
                        function.name
                    );
                }
                other => {
                    yul_assert!(
                        !statement_contains_function_definition(other),
                        "function definition below the top level; hoist functions before inlining"
                    );
                }
            }
        }

        let call_counts = ReferencesCounter::count_calls(dialect, code);
        let guard = GrowthGuard::new(estimator.block_size(code), settings.global_size_threshold);
        debug!(
            "inliner: {} functions, initial size {}, threshold {}",
            functions.len(),
            guard.current(),
            guard.threshold()
        );

        Ok(Self {
            dialect,
            settings,
            estimator,
            side_effects: SideEffects::new(dialect),
            dispenser,
            functions,
            eligible,
            call_counts,
            transitive: TransitiveCost::new(),
            guard,
            stats: InlinerStats::default(),
        })
    }

    pub fn run(mut self, code: &mut Block) -> Result<InlinerStats> {
        let mut chain = Vec::new();
        self.process_block(code, &mut chain)?;
        self.stats.guard_tripped = self.guard.is_closed();
        self.stats.final_size = self.guard.current();
        debug!(
            "inliner: {} calls inlined, final size {}",
            self.stats.inlined, self.stats.final_size
        );
        Ok(self.stats)
    }

    /// Live call count of a function
    pub fn call_count(&self, name: &str) -> usize {
        self.call_counts.get(name).copied().unwrap_or(0)
    }

    fn process_block(&mut self, block: &mut Block, chain: &mut Vec<Name>) -> Result<()> {
        let statements = std::mem::take(&mut block.statements);
        let mut out = Vec::with_capacity(statements.len());
        for statement in statements {
            self.process_statement(statement, chain, &mut out)?;
        }
        block.statements = out;
        Ok(())
    }

    /// Appends the processed statement and everything that has to run
    /// before it to `out`
    fn process_statement(
        &mut self,
        statement: Statement,
        chain: &mut Vec<Name>,
        out: &mut Vec<Statement>,
    ) -> Result<()> {
        let mut pending = Vec::new();
        match statement {
            Statement::FunctionDefinition(mut function) => {
                yul_assert!(
                    chain.is_empty(),
                    "function {} defined inside inlined code",
                    function.name
                );
                chain.push(function.name.clone());
                self.process_block(&mut function.body, chain)?;
                chain.pop();
                out.push(Statement::FunctionDefinition(function));
            }
            Statement::ExpressionStatement(Expression::FunctionCall(mut call))
                if !self.dialect.is_builtin(&call.function_name) =>
            {
                self.process_arguments(&mut call.arguments, chain, &mut pending)?;
                if self.decide(&call, chain)? {
                    let removed = self.estimator.call_size(&call);
                    let returns = self.inline_call(&call, chain, Size::ZERO, removed, &mut pending)?;
                    yul_assert!(
                        returns.is_empty(),
                        "value of {} discarded by an expression statement",
                        call.function_name
                    );
                    out.extend(pending);
                } else {
                    out.extend(pending);
                    out.push(Statement::ExpressionStatement(Expression::FunctionCall(call)));
                }
            }
            Statement::VariableDeclaration {
                variables,
                value: Some(Expression::FunctionCall(mut call)),
            } if !self.dialect.is_builtin(&call.function_name) => {
                self.process_arguments(&mut call.arguments, chain, &mut pending)?;
                if self.decide(&call, chain)? {
                    let replacement = self.split_size(variables.len());
                    let removed = Size::new(self.estimator.weights().statement)
                        + self.estimator.call_size(&call);
                    let returns = self.inline_call(&call, chain, replacement, removed, &mut pending)?;
                    yul_assert!(
                        returns.len() == variables.len(),
                        "{} values of {} assigned to {} variables",
                        returns.len(),
                        call.function_name,
                        variables.len()
                    );
                    out.extend(pending);
                    for (variable, value) in variables.into_iter().zip(returns) {
                        out.push(Statement::declare(
                            vec![variable],
                            Some(Expression::identifier(value)),
                        ));
                    }
                } else {
                    out.extend(pending);
                    out.push(Statement::declare(
                        variables,
                        Some(Expression::FunctionCall(call)),
                    ));
                }
            }
            Statement::Assignment {
                variable_names,
                value: Expression::FunctionCall(mut call),
            } if !self.dialect.is_builtin(&call.function_name) => {
                self.process_arguments(&mut call.arguments, chain, &mut pending)?;
                if self.decide(&call, chain)? {
                    let replacement = self.split_size(variable_names.len());
                    let removed = Size::new(self.estimator.weights().statement)
                        + self.estimator.call_size(&call);
                    let returns = self.inline_call(&call, chain, replacement, removed, &mut pending)?;
                    yul_assert!(
                        returns.len() == variable_names.len(),
                        "{} values of {} assigned to {} variables",
                        returns.len(),
                        call.function_name,
                        variable_names.len()
                    );
                    out.extend(pending);
                    for (target, value) in variable_names.into_iter().zip(returns) {
                        out.push(Statement::assign(vec![target], Expression::identifier(value)));
                    }
                } else {
                    out.extend(pending);
                    out.push(Statement::assign(
                        variable_names,
                        Expression::FunctionCall(call),
                    ));
                }
            }
            Statement::ExpressionStatement(mut expression) => {
                self.process_expression(&mut expression, chain, &mut pending)?;
                out.extend(pending);
                out.push(Statement::ExpressionStatement(expression));
            }
            Statement::VariableDeclaration {
                variables,
                value: Some(mut value),
            } => {
                self.process_expression(&mut value, chain, &mut pending)?;
                out.extend(pending);
                out.push(Statement::declare(variables, Some(value)));
            }
            Statement::Assignment {
                variable_names,
                mut value,
            } => {
                self.process_expression(&mut value, chain, &mut pending)?;
                out.extend(pending);
                out.push(Statement::assign(variable_names, value));
            }
            Statement::If {
                mut condition,
                mut body,
            } => {
                self.process_expression(&mut condition, chain, &mut pending)?;
                self.process_block(&mut body, chain)?;
                out.extend(pending);
                out.push(Statement::If { condition, body });
            }
            Statement::Switch {
                mut expression,
                mut cases,
            } => {
                self.process_expression(&mut expression, chain, &mut pending)?;
                for Case { body, .. } in &mut cases {
                    self.process_block(body, chain)?;
                }
                out.extend(pending);
                out.push(Statement::Switch { expression, cases });
            }
            Statement::ForLoop {
                mut pre,
                condition,
                mut post,
                mut body,
            } => {
                // The condition runs once per iteration and stays untouched.
                self.process_block(&mut pre, chain)?;
                self.process_block(&mut body, chain)?;
                self.process_block(&mut post, chain)?;
                out.push(Statement::ForLoop {
                    pre,
                    condition,
                    post,
                    body,
                });
            }
            Statement::Block(mut block) => {
                self.process_block(&mut block, chain)?;
                out.push(Statement::Block(block));
            }
            other => out.push(other),
        }
        Ok(())
    }

    /// Returns whether a call was inlined somewhere in the expression
    fn process_expression(
        &mut self,
        expression: &mut Expression,
        chain: &mut Vec<Name>,
        pending: &mut Vec<Statement>,
    ) -> Result<bool> {
        let Expression::FunctionCall(call) = expression else {
            return Ok(false);
        };
        let inlined_below = self.process_arguments(&mut call.arguments, chain, pending)?;
        if self.dialect.is_builtin(&call.function_name) || !self.decide(call, chain)? {
            return Ok(inlined_below);
        }
        let removed = self.estimator.call_size(call);
        let replacement = Size::new(self.estimator.weights().identifier);
        let returns = self.inline_call(call, chain, replacement, removed, pending)?;
        yul_assert!(
            returns.len() == 1,
            "{} returns {} values where one is expected",
            call.function_name,
            returns.len()
        );
        *expression = Expression::identifier(returns[0].clone());
        Ok(true)
    }

    /// Processes arguments left to right. When a call inside an argument is
    /// inlined, its code runs ahead of the whole statement, so every earlier
    /// argument that is not movable is first bound to a temporary at the
    /// point where it was evaluated.
    fn process_arguments(
        &mut self,
        arguments: &mut [Expression],
        chain: &mut Vec<Name>,
        pending: &mut Vec<Statement>,
    ) -> Result<bool> {
        let mut marks = Vec::with_capacity(arguments.len());
        let mut inlined = false;
        for index in 0..arguments.len() {
            if self.process_expression(&mut arguments[index], chain, pending)? {
                inlined = true;
                self.hoist(&mut arguments[..index], &marks, pending);
            }
            marks.push(pending.len());
        }
        Ok(inlined)
    }

    fn hoist(&mut self, earlier: &mut [Expression], marks: &[usize], pending: &mut Vec<Statement>) {
        let weights = self.estimator.weights();
        let cost = (weights.statement + weights.identifier) as i64;
        let mut shift = 0;
        for (argument, mark) in earlier.iter_mut().zip(marks) {
            if self.side_effects.is_movable(argument) {
                continue;
            }
            let name = self.dispenser.new_name("expr");
            trace!("binding argument {} to {}", argument, name);
            let value = std::mem::replace(argument, Expression::identifier(name.clone()));
            pending.insert(
                mark + shift,
                Statement::declare(vec![TypedName::new(name)], Some(value)),
            );
            shift += 1;
            self.guard.record(cost);
            self.stats.hoisted_arguments += 1;
        }
    }

    /// Decision for one call to a user function, in priority order:
    /// eligibility, recursion depth, growth guard, single use, size budget.
    fn decide(&mut self, call: &FunctionCall, chain: &[Name]) -> Result<bool> {
        let name = call.function_name.as_str();
        yul_assert!(
            self.functions.contains_key(name),
            "call to unknown function {}",
            name
        );

        if !self.eligible.get(name).copied().unwrap_or(false) {
            return Ok(self.skip(name, SkipReason::Ineligible));
        }
        let depth = chain.iter().filter(|entry| entry.as_str() == name).count();
        if depth >= self.settings.max_recursion_depth {
            return Ok(self.skip(name, SkipReason::RecursionDepth));
        }
        if !self.guard.is_open() {
            return Ok(self.skip(name, SkipReason::GuardClosed));
        }
        if self.call_count(name) == 1 {
            trace!("inlining {}: single use", name);
            self.stats.inlined_single_use += 1;
            return Ok(true);
        }

        let expanded = self
            .transitive
            .cost(&self.estimator, &self.functions, name)
            + self.binding_size(call);
        let budget = self
            .estimator
            .call_size(call)
            .saturating_mul(self.settings.per_site_size_multiplier);
        if expanded.is_unbounded() || expanded > budget {
            trace!("not inlining {}: expanded size {} over budget {}", name, expanded, budget);
            return Ok(self.skip(name, SkipReason::TooLarge));
        }
        trace!("inlining {}: expanded size {} within budget {}", name, expanded, budget);
        Ok(true)
    }

    fn skip(&mut self, name: &str, reason: SkipReason) -> bool {
        trace!("not inlining {}: {:?}", name, reason);
        self.stats.skip(reason);
        false
    }

    /// Upper bound on what the bindings of an inlined call add
    fn binding_size(&self, call: &FunctionCall) -> Size {
        let weights = self.estimator.weights();
        let declarations = self
            .functions
            .get(&call.function_name)
            .map(|function| function.parameters.len() + function.return_variables.len())
            .unwrap_or(0);
        let arguments: Size = call
            .arguments
            .iter()
            .map(|argument| self.estimator.expression_size(argument))
            .sum();
        Size::new(weights.statement).saturating_mul(declarations as u64) + arguments
    }

    /// Size of `let a := r_1` / `a := r_1` for each of `count` variables
    fn split_size(&self, count: usize) -> Size {
        let weights = self.estimator.weights();
        Size::new(weights.statement + weights.identifier).saturating_mul(count as u64)
    }

    /// Rewrites the call, accounts for the size change, walks the copied
    /// body and appends prologue and body to `pending`. `replacement` is the
    /// size of what takes the call's place, `removed` the size it replaces.
    fn inline_call(
        &mut self,
        call: &FunctionCall,
        chain: &mut Vec<Name>,
        replacement: Size,
        removed: Size,
        pending: &mut Vec<Statement>,
    ) -> Result<Vec<Name>> {
        let function = self
            .functions
            .get(&call.function_name)
            .cloned()
            .ok_or_else(|| {
                yul_core::Error::internal(format!("call to unknown function {}", call.function_name))
            })?;
        let mut inlined: InlinedCall =
            CallSiteRewriter::new(self.dialect, &mut *self.dispenser).rewrite(call, &function)?;

        let added = self.estimator.statements_size(&inlined.prologue)
            + self.estimator.block_size(&inlined.body)
            + replacement;
        let delta = added.delta_from(removed);
        self.guard.record(delta);
        trace!(
            "inlined {} (size {:+}, program size {})",
            function.name,
            delta,
            self.guard.current()
        );

        if let Some(count) = self.call_counts.get_mut(&function.name) {
            *count = count.saturating_sub(1);
        }
        for (callee, count) in ReferencesCounter::count_calls(self.dialect, &inlined.body) {
            *self.call_counts.entry(callee).or_insert(0) += count;
        }
        self.stats.inlined += 1;

        chain.push(function.name.clone());
        self.process_block(&mut inlined.body, chain)?;
        chain.pop();

        let return_variables = std::mem::take(&mut inlined.return_variables);
        pending.extend(inlined.into_statements());
        Ok(return_variables)
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod driver_tests;
