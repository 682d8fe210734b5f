//! This module contains the lexical [`ScopeTree`] and the symbol bookkeeping
//! that backs it.
//!
//! Scopes are nested frames holding versioned variable bindings. Each locally
//! declared symbol owns exactly one _placeholder_ for the frame's lifetime (a
//! stable term the solver can book-keep against) alongside a _valuation_ (the
//! symbol's current symbolic value), and lookups that miss a frame delegate up
//! the parent chain.
//!
//! Frames live in an arena indexed by [`ScopeId`] with parent links held as
//! ids, so hypothetical execution states can share ancestor frames freely and
//! the whole tree drops at once when an interpretation run ends.
//!
//! # Versioned Bindings
//!
//! Assignment records the new valuation as the _assigning frame's_ version of
//! the binding, while the placeholder stays with the frame that declared the
//! symbol. Valuation lookups return the nearest version on the walk from the
//! querying frame to the root. Sibling frames therefore never observe each
//! other's writes even though they share every ancestor frame, which is the
//! invariant that path forking and joining are built on.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    error::scope::{Error, Result},
    solver::Oracle,
    term::{Sort, Term},
};

/// An opaque identity for one declared variable occurrence.
///
/// Symbols are handed out by the [`SymbolFactory`] and are never reused or
/// recycled within a run, so two distinct declarations always compare
/// unequal even when they shadow the same source identifier.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct Symbol(u32);

impl Symbol {
    /// Gets the raw index of the symbol.
    ///
    /// This index doubles as the variable id of the symbol's placeholder
    /// term, so symbols and term variables share one namespace.
    #[must_use]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// The factory from which all symbols in one scope tree are drawn.
///
/// A single factory is shared by the entire tree so that identities never
/// collide across nested frames. It is owned by the tree (rather than being
/// process-global) so that concurrent interpretation runs never race on it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SymbolFactory {
    next: u32,
}

impl SymbolFactory {
    /// Constructs a new factory whose first symbol has index zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next symbol. Monotonic; never fails, never reuses.
    pub fn next(&mut self) -> Symbol {
        let symbol = Symbol(self.next);
        self.next += 1;
        symbol
    }
}

/// The identity of a frame within a [`ScopeTree`].
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub struct ScopeId(u32);

/// A single lexical frame.
#[derive(Clone, Debug)]
struct Frame {
    /// The parent frame, if this is not the root.
    parent: Option<ScopeId>,

    /// The identifiers bound in this frame.
    identifiers: HashMap<String, Symbol>,

    /// The placeholder for each symbol declared in this frame.
    ///
    /// Once a symbol appears here it keeps the same placeholder for the
    /// frame's whole lifetime; only valuations change.
    placeholders: BTreeMap<Symbol, Term>,

    /// This frame's version of each binding it has declared or assigned.
    ///
    /// This can contain symbols declared in ancestor frames; those entries
    /// are the versions written by assignment through this frame.
    valuations: BTreeMap<Symbol, Term>,
}

impl Frame {
    fn new(parent: Option<ScopeId>) -> Self {
        let identifiers = HashMap::new();
        let placeholders = BTreeMap::new();
        let valuations = BTreeMap::new();
        Self {
            parent,
            identifiers,
            placeholders,
            valuations,
        }
    }
}

/// The arena of lexical frames for one interpretation run.
///
/// All operations address frames by [`ScopeId`]. The root frame exists from
/// construction; every other frame is created by [`ScopeTree::branch`], once
/// per path fork.
#[derive(Clone, Debug)]
pub struct ScopeTree {
    /// The frames of the tree, indexed by [`ScopeId`].
    frames: Vec<Frame>,

    /// The factory shared by every frame of this tree.
    factory: SymbolFactory,
}

impl ScopeTree {
    /// Constructs a new scope tree containing only the root frame.
    #[must_use]
    pub fn new() -> Self {
        let frames = vec![Frame::new(None)];
        let factory = SymbolFactory::new();
        Self { frames, factory }
    }

    /// Gets the id of the root frame.
    #[must_use]
    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Creates a new empty frame whose parent is `scope`, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `scope` does not exist.
    pub fn branch(&mut self, scope: ScopeId) -> Result<ScopeId> {
        self.frame(scope)?;
        let id = ScopeId(
            u32::try_from(self.frames.len()).expect("Scope count should not exceed u32::MAX"),
        );
        self.frames.push(Frame::new(Some(scope)));
        Ok(id)
    }

    /// Gets the parent of `scope`, or [`None`] at the root.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `scope` does not exist.
    pub fn parent(&self, scope: ScopeId) -> Result<Option<ScopeId>> {
        Ok(self.frame(scope)?.parent)
    }

    /// Registers `identifier` in the local table of `scope`, returning its
    /// symbol.
    ///
    /// Binding is idempotent per identifier within one frame: binding the
    /// same identifier twice yields the same symbol. Binding an identifier
    /// that an ancestor frame has bound creates a fresh symbol, which is how
    /// shadowing begins.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `scope` does not exist.
    pub fn bind(&mut self, scope: ScopeId, identifier: impl Into<String>) -> Result<Symbol> {
        self.frame(scope)?;
        let identifier = identifier.into();
        if let Some(existing) = self.frames[scope.0 as usize].identifiers.get(&identifier) {
            return Ok(*existing);
        }

        let symbol = self.factory.next();
        self.frames[scope.0 as usize].identifiers.insert(identifier, symbol);
        Ok(symbol)
    }

    /// Searches for `identifier` in the local table of `scope` and then up
    /// the parent chain, returning the symbol together with the frame that
    /// owns it.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the identifier is not declared anywhere on the
    /// chain. This is a front-end contract violation, never a feasibility
    /// outcome, and the interpretation that hits it must be abandoned.
    pub fn lookup(&self, scope: ScopeId, identifier: &str) -> Result<(Symbol, ScopeId)> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = self.frame(id)?;
            if let Some(symbol) = frame.identifiers.get(identifier) {
                return Ok((*symbol, id));
            }
            current = frame.parent;
        }

        Err(Error::UndeclaredIdentifier {
            scope,
            name: identifier.to_string(),
        })
    }

    /// Declares `symbol` in `scope` with the canonical zero valuation for
    /// `sort`, returning the placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the symbol already has a placeholder in this frame
    /// or if `scope` does not exist.
    pub fn define(&mut self, scope: ScopeId, symbol: Symbol, sort: Sort) -> Result<Term> {
        self.declare(scope, symbol, sort.canonical_zero())
    }

    /// Declares `symbol` in `scope` with the provided `initial` valuation,
    /// creating the frame-local (placeholder, valuation) pair and returning
    /// the placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the symbol already has a placeholder in this frame.
    /// There is no silent re-declaration within one frame; shadowing must go
    /// through a child frame created by [`Self::branch`].
    pub fn declare(&mut self, scope: ScopeId, symbol: Symbol, initial: Term) -> Result<Term> {
        let frame = self.frame_mut(scope)?;
        if frame.placeholders.contains_key(&symbol) {
            return Err(Error::AlreadyDeclared { scope, symbol });
        }

        let placeholder = Term::variable(symbol.index(), initial.sort());
        frame.placeholders.insert(symbol, placeholder.clone());
        frame.valuations.insert(symbol, initial);
        Ok(placeholder)
    }

    /// Declares `symbol` in `scope` as an unconstrained input of `sort`: its
    /// valuation is its own placeholder, so the oracle treats it as free.
    ///
    /// This is how function parameters enter the symbolic state.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the symbol already has a placeholder in this frame.
    pub fn declare_input(&mut self, scope: ScopeId, symbol: Symbol, sort: Sort) -> Result<Term> {
        self.declare(scope, symbol, Term::variable(symbol.index(), sort))
    }

    /// Overwrites the valuation of `symbol` as seen from `scope`, leaving its
    /// placeholder unchanged.
    ///
    /// The new valuation is recorded as this frame's version of the binding
    /// (see the module documentation), so the mutation is visible to every
    /// path still reading through this frame while sibling frames remain
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the symbol is not declared anywhere on the chain —
    /// assignment to an unbound symbol is a fatal contract violation.
    pub fn assign(&mut self, scope: ScopeId, symbol: Symbol, valuation: Term) -> Result<()> {
        self.owning_scope(scope, symbol)?;
        self.frame_mut(scope)?.valuations.insert(symbol, valuation);
        Ok(())
    }

    /// Gets the placeholder of `symbol` as seen from `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the symbol is not declared anywhere on the chain.
    pub fn placeholder(&self, scope: ScopeId, symbol: Symbol) -> Result<Term> {
        let owner = self.owning_scope(scope, symbol)?;
        Ok(self.frames[owner.0 as usize].placeholders[&symbol].clone())
    }

    /// Gets the current valuation of `symbol` as seen from `scope`: the
    /// nearest version on the walk from `scope` to the root.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if the symbol is not declared anywhere on the chain.
    pub fn valuation(&self, scope: ScopeId, symbol: Symbol) -> Result<Term> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = self.frame(id)?;
            if let Some(valuation) = frame.valuations.get(&symbol) {
                return Ok(valuation.clone());
            }
            current = frame.parent;
        }

        Err(Error::UnboundSymbol { scope, symbol })
    }

    /// Visits every symbol visible from `scope` (declared in the frame
    /// itself or any ancestor) exactly once, with its placeholder and its
    /// valuation as seen from `scope`.
    ///
    /// Symbols are visited in increasing declaration order per frame,
    /// innermost frame first, so enumeration is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `scope` does not exist.
    pub fn visible_symbols(
        &self,
        scope: ScopeId,
        mut visit: impl FnMut(Symbol, &Term, &Term),
    ) -> Result<()> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = self.frame(id)?;
            for (symbol, placeholder) in &frame.placeholders {
                let valuation = self.valuation(scope, *symbol)?;
                visit(*symbol, placeholder, &valuation);
            }
            current = frame.parent;
        }

        Ok(())
    }

    /// Asserts `placeholder == valuation` for every symbol visible from
    /// `scope` into the oracle's current assertion frame.
    ///
    /// This is the feasibility-check context: the caller pushes a frame,
    /// calls this, additionally asserts the path condition, and queries
    /// satisfiability, instead of re-deriving the whole symbolic state from
    /// scratch on every check. The caller is responsible for popping the
    /// frame afterwards so that no binding leaks into sibling checks.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if `scope` does not exist or the oracle rejects an
    /// assertion.
    pub fn assert_bindings(
        &self,
        scope: ScopeId,
        oracle: &mut impl Oracle,
    ) -> crate::error::Result<()> {
        let mut equalities = Vec::new();
        self.visible_symbols(scope, |_, placeholder, valuation| {
            equalities.push(Term::eq(placeholder.clone(), valuation.clone()));
        })?;
        for equality in equalities {
            oracle.assert_term(&equality)?;
        }

        Ok(())
    }

    /// Resolves the frame on the chain from `scope` that declared `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`Err`] if no frame on the chain declares the symbol.
    pub fn owning_scope(&self, scope: ScopeId, symbol: Symbol) -> Result<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let frame = self.frame(id)?;
            if frame.placeholders.contains_key(&symbol) {
                return Ok(id);
            }
            current = frame.parent;
        }

        Err(Error::UnboundSymbol { scope, symbol })
    }

    /// Issues a fresh symbol from the tree's shared factory.
    pub fn fresh_symbol(&mut self) -> Symbol {
        self.factory.next()
    }

    fn frame(&self, scope: ScopeId) -> Result<&Frame> {
        self.frames
            .get(scope.0 as usize)
            .ok_or(Error::NoSuchScope { scope })
    }

    fn frame_mut(&mut self, scope: ScopeId) -> Result<&mut Frame> {
        self.frames
            .get_mut(scope.0 as usize)
            .ok_or(Error::NoSuchScope { scope })
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}
