//! Core interpreter implementation

use crate::builtins;
use crate::environment::Environment;
use crate::error::{InterpreterError, InterpreterResult};
use crate::state::{MachineState, Termination};
use log::debug;
use primitive_types::U256;
use yul_core::analysis::literal_value;
use yul_core::ast::{Block, Case, Expression, FunctionCall, FunctionDefinition, Statement};
use yul_core::{Dialect, Object};

/// Interpreter options
#[derive(Debug, Clone)]
pub struct InterpreterOptions {
    /// Statements and loop iterations executed before giving up
    pub max_steps: usize,
    /// Maximum depth of nested user function calls
    pub max_call_depth: usize,
    pub calldata: Vec<u8>,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self {
            max_steps: 100_000,
            max_call_depth: 256,
            calldata: Vec::new(),
        }
    }
}

/// Why evaluation stopped early
pub(crate) enum Signal {
    Halt(Termination),
    Fault(InterpreterError),
}

impl From<InterpreterError> for Signal {
    fn from(error: InterpreterError) -> Self {
        Signal::Fault(error)
    }
}

/// Control flow out of a statement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Normal,
    Break,
    Continue,
    Leave,
}

type Eval<T> = Result<T, Signal>;

/// Tree-walking interpreter for Yul code
pub struct Interpreter<'a> {
    dialect: &'a Dialect,
    options: InterpreterOptions,
    env: Environment<'a>,
    state: MachineState,
    steps: usize,
    call_depth: usize,
}

impl<'a> Interpreter<'a> {
    pub fn new(dialect: &'a Dialect, options: InterpreterOptions) -> Self {
        let state = MachineState::new(options.calldata.clone());
        Self {
            dialect,
            options,
            env: Environment::new(),
            state,
            steps: 0,
            call_depth: 0,
        }
    }

    /// Execute a code block to completion
    pub fn run(&mut self, code: &'a Block) -> InterpreterResult<Termination> {
        let termination = match self.block(code) {
            Ok(Flow::Normal) => Termination::Finished,
            Ok(Flow::Break) => return Err(InterpreterError::BreakOutsideLoop),
            Ok(Flow::Continue) => return Err(InterpreterError::ContinueOutsideLoop),
            Ok(Flow::Leave) => return Err(InterpreterError::LeaveOutsideFunction),
            Err(Signal::Halt(termination)) => termination,
            Err(Signal::Fault(error)) => return Err(error),
        };
        debug!("execution {} after {} steps", termination, self.steps);
        Ok(termination)
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn into_state(self) -> MachineState {
        self.state
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    fn step(&mut self) -> Eval<()> {
        self.steps += 1;
        if self.steps > self.options.max_steps {
            return Err(InterpreterError::StepLimitExceeded(self.options.max_steps).into());
        }
        Ok(())
    }

    fn block(&mut self, block: &'a Block) -> Eval<Flow> {
        self.env.push_scope();
        for function in block.functions() {
            self.env.define_function(function);
        }
        let flow = self.statements(&block.statements);
        self.env.pop_scope();
        flow
    }

    fn statements(&mut self, statements: &'a [Statement]) -> Eval<Flow> {
        for statement in statements {
            let flow = self.statement(statement)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn statement(&mut self, statement: &'a Statement) -> Eval<Flow> {
        self.step()?;
        match statement {
            Statement::ExpressionStatement(expression) => {
                let values = self.evaluate(expression)?;
                expect_values(0, values.len())?;
            }
            Statement::Assignment {
                variable_names,
                value,
            } => {
                let values = self.evaluate(value)?;
                expect_values(variable_names.len(), values.len())?;
                for (name, value) in variable_names.iter().zip(values) {
                    self.env.assign(name, value)?;
                }
            }
            Statement::VariableDeclaration { variables, value } => {
                let values = match value {
                    Some(value) => self.evaluate(value)?,
                    None => vec![U256::zero(); variables.len()],
                };
                expect_values(variables.len(), values.len())?;
                for (variable, value) in variables.iter().zip(values) {
                    self.env.define(&variable.name, value);
                }
            }
            Statement::FunctionDefinition(_) => {}
            Statement::If { condition, body } => {
                if !self.single(condition)?.is_zero() {
                    return self.block(body);
                }
            }
            Statement::Switch { expression, cases } => {
                let value = self.single(expression)?;
                if let Some(case) = self.select_case(cases, value)? {
                    return self.block(&case.body);
                }
            }
            Statement::ForLoop {
                pre,
                condition,
                post,
                body,
            } => {
                // Variables of the init block live for the whole loop.
                self.env.push_scope();
                let flow = self.for_loop(pre, condition, post, body);
                self.env.pop_scope();
                return flow;
            }
            Statement::Break => return Ok(Flow::Break),
            Statement::Continue => return Ok(Flow::Continue),
            Statement::Leave => return Ok(Flow::Leave),
            Statement::Block(block) => return self.block(block),
        }
        Ok(Flow::Normal)
    }

    fn select_case(&self, cases: &'a [Case], value: U256) -> Eval<Option<&'a Case>> {
        let mut default = None;
        for case in cases {
            match &case.value {
                Some(literal) => {
                    let label = literal_value(literal)
                        .ok_or_else(|| InterpreterError::InvalidLiteral(literal.value.clone()))?;
                    if label == value {
                        return Ok(Some(case));
                    }
                }
                None => default = Some(case),
            }
        }
        Ok(default)
    }

    fn for_loop(
        &mut self,
        pre: &'a Block,
        condition: &'a Expression,
        post: &'a Block,
        body: &'a Block,
    ) -> Eval<Flow> {
        for function in pre.functions() {
            self.env.define_function(function);
        }
        let flow = self.statements(&pre.statements)?;
        if flow != Flow::Normal {
            return Ok(flow);
        }
        loop {
            self.step()?;
            if self.single(condition)?.is_zero() {
                break;
            }
            match self.block(body)? {
                Flow::Break => break,
                Flow::Leave => return Ok(Flow::Leave),
                Flow::Normal | Flow::Continue => {}
            }
            let flow = self.block(post)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn evaluate(&mut self, expression: &'a Expression) -> Eval<Vec<U256>> {
        match expression {
            Expression::Literal(literal) => {
                let value = literal_value(literal)
                    .ok_or_else(|| InterpreterError::InvalidLiteral(literal.value.clone()))?;
                Ok(vec![value])
            }
            Expression::Identifier(name) => Ok(vec![self.env.lookup(name)?]),
            Expression::FunctionCall(call) => self.call(call),
        }
    }

    fn single(&mut self, expression: &'a Expression) -> Eval<U256> {
        let values = self.evaluate(expression)?;
        expect_values(1, values.len())?;
        Ok(values[0])
    }

    fn call(&mut self, call: &'a FunctionCall) -> Eval<Vec<U256>> {
        // Arguments are evaluated left to right.
        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.single(argument)?);
        }

        let name = call.function_name.as_str();
        if let Some(builtin) = self.dialect.builtin(name) {
            check_arity(name, builtin.parameters, arguments.len())?;
            return builtins::call(name, &arguments, &mut self.state);
        }
        let function = self.env.function(name)?;
        check_arity(name, function.parameters.len(), arguments.len())?;
        self.call_function(function, arguments)
    }

    fn call_function(&mut self, function: &'a FunctionDefinition, arguments: Vec<U256>) -> Eval<Vec<U256>> {
        if self.call_depth >= self.options.max_call_depth {
            return Err(InterpreterError::StackOverflow(self.options.max_call_depth).into());
        }
        self.call_depth += 1;
        self.env.push_frame();
        for (parameter, value) in function.parameters.iter().zip(arguments) {
            self.env.define(&parameter.name, value);
        }
        for variable in &function.return_variables {
            self.env.define(&variable.name, U256::zero());
        }

        let values = match self.block(&function.body) {
            Ok(Flow::Normal) | Ok(Flow::Leave) => function
                .return_variables
                .iter()
                .map(|variable| self.env.lookup(&variable.name))
                .collect::<InterpreterResult<Vec<_>>>()
                .map_err(Signal::from),
            Ok(Flow::Break) => Err(InterpreterError::BreakOutsideLoop.into()),
            Ok(Flow::Continue) => Err(InterpreterError::ContinueOutsideLoop.into()),
            Err(signal) => Err(signal),
        };

        self.env.pop_scope();
        self.call_depth -= 1;
        values
    }
}

fn expect_values(expected: usize, actual: usize) -> Eval<()> {
    if expected != actual {
        return Err(InterpreterError::ValueCount { expected, actual }.into());
    }
    Ok(())
}

fn check_arity(function: &str, expected: usize, actual: usize) -> Eval<()> {
    if expected != actual {
        return Err(InterpreterError::ArityError {
            function: function.to_string(),
            expected,
            actual,
        }
        .into());
    }
    Ok(())
}

/// Run a code block with fresh state
pub fn execute(
    dialect: &Dialect,
    code: &Block,
    options: InterpreterOptions,
) -> InterpreterResult<(Termination, MachineState)> {
    let mut interpreter = Interpreter::new(dialect, options);
    let termination = interpreter.run(code)?;
    Ok((termination, interpreter.into_state()))
}

/// Run the code of an object. Sub-objects are not executed.
pub fn execute_object(
    dialect: &Dialect,
    object: &Object,
    options: InterpreterOptions,
) -> InterpreterResult<(Termination, MachineState)> {
    execute(dialect, &object.code, options)
}
