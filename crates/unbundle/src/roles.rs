//! Role assignment for module closure parameters.
//!
//! The bootstrap invokes every closure as
//! `table[id].call(<mod>.<key>, <a>, <b>, <c>)`, where one of `a`, `b`, `c` is the module
//! object `<mod>`, one is `<mod>.<key>` (the exports object) and the remaining one is the
//! require function. Which argument position carries which role is read off that call site
//! once and applies to every closure in the bundle.

use crate::error::{Error, Result};

/// Owned shape of one argument at the closure invocation call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    /// A plain identifier, e.g. `module`.
    Identifier(String),
    /// `object.property` with an identifier object, e.g. `module.exports`.
    Member { object: String, property: String },
    Other,
}

/// The `.call(this, a, b, c)` that invokes module closures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSite {
    pub this_arg: CallArg,
    pub args: Vec<CallArg>,
}

/// The part a closure parameter plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Require,
    Module,
    Exports,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Require, Role::Module, Role::Exports];

    /// The CommonJS name the parameter is renamed to.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Role::Require => "require",
            Role::Module => "module",
            Role::Exports => "exports",
        }
    }
}

/// Parameter positions of the module, exports and require roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureRoles {
    pub module: usize,
    pub exports: usize,
    pub require: usize,
    /// Property of the module object holding the exports, usually `exports`.
    pub exports_key: String,
    /// Name of the require function inside the bootstrap.
    pub require_name: String,
}

impl ClosureRoles {
    pub fn position(&self, role: Role) -> usize {
        match role {
            Role::Require => self.require,
            Role::Module => self.module,
            Role::Exports => self.exports,
        }
    }

    /// Browserify's fixed `function(require, module, exports)` closure layout.
    pub fn commonjs() -> Self {
        Self {
            module: 1,
            exports: 2,
            require: 0,
            exports_key: "exports".into(),
            require_name: "require".into(),
        }
    }

    /// Read the roles off an invocation site.
    pub fn resolve(site: &InvocationSite) -> Result<Self> {
        let CallArg::Member {
            object: module_name,
            property: exports_key,
        } = &site.this_arg
        else {
            return Err(Error::RoleResolution(
                "the closure receiver is not a property of the module object".into(),
            ));
        };

        if site.args.len() != 3 {
            return Err(Error::RoleResolution(format!(
                "closures are invoked with {} arguments instead of 3",
                site.args.len()
            )));
        }

        let mut members = site
            .args
            .iter()
            .enumerate()
            .filter(|(_, arg)| matches!(arg, CallArg::Member { .. }));
        let exports = match (members.next(), members.next()) {
            (Some((position, _)), None) => position,
            (None, _) => {
                return Err(Error::RoleResolution(
                    "no argument passes the exports object".into(),
                ));
            }
            (Some(_), Some(_)) => {
                return Err(Error::RoleResolution(
                    "more than one argument looks like the exports object".into(),
                ));
            }
        };

        let module = site
            .args
            .iter()
            .position(|arg| matches!(arg, CallArg::Identifier(name) if name == module_name))
            .ok_or_else(|| {
                Error::RoleResolution(format!("no argument passes the module object `{module_name}`"))
            })?;

        let require = (0..3)
            .find(|position| *position != module && *position != exports)
            .ok_or_else(|| Error::RoleResolution("no argument left for require".into()))?;
        let CallArg::Identifier(require_name) = &site.args[require] else {
            return Err(Error::RoleResolution(
                "the require function is not passed by name".into(),
            ));
        };

        tracing::debug!(module, exports, require, %exports_key, %require_name, "resolved closure roles");

        Ok(Self {
            module,
            exports,
            require,
            exports_key: exports_key.clone(),
            require_name: require_name.clone(),
        })
    }
}
