//! Class manager directive shell
//!
//! Every concrete manager (tasks, semaphores, queues, ...) runs the same
//! four sequences over its class registry:
//!
//! - **create**: allocate, fill the body, open under a name
//! - **ident**: name to id over a node selector
//! - **delete**: get (must be local), teardown, close, free
//! - **directive with id**: get, then act locally or hand a remote id to
//!   the inter-node transport
//!
//! An object locked by another context is reported as `InUse` rather than
//! waited for.
//!
//! A class compiled out of the build is a manager with no registry; every
//! directive then returns `NotConfigured` without touching any state.

use crate::ob::{
    FatalError, InformationFlags, Lookup, NodeSelector, ObjectClass, ObjectId, ObjectInformation,
    ObjectName, ObjectsContext, ObjectsError,
};

/// Outcome of a directive on an id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch<R> {
    /// The directive ran on a local object
    Local(R),
    /// The object lives on another node; forward the request
    Remote(ObjectId),
}

/// Directive shell over one class registry
pub struct ClassManager<T> {
    class: ObjectClass,
    information: Option<ObjectInformation<T>>,
}

impl<T: Default> ClassManager<T> {
    /// Manager for a configured class
    pub fn new(
        ctx: &ObjectsContext,
        class: ObjectClass,
        flags: InformationFlags,
        maximum: u32,
    ) -> Result<Self, FatalError> {
        let information = ObjectInformation::new(ctx, class, flags, maximum)?;
        Ok(Self {
            class,
            information: Some(information),
        })
    }
}

impl<T> ClassManager<T> {
    /// Manager for a class left out of the build
    pub const fn unconfigured(class: ObjectClass) -> Self {
        Self {
            class,
            information: None,
        }
    }

    #[inline]
    pub fn class(&self) -> ObjectClass {
        self.class
    }

    #[inline]
    pub fn is_configured(&self) -> bool {
        self.information.is_some()
    }

    /// The class registry
    pub fn information(&self) -> Result<&ObjectInformation<T>, ObjectsError> {
        self.information.as_ref().ok_or(ObjectsError::NotConfigured)
    }

    /// Create an object named `name`, letting `init` fill in its body
    ///
    /// # Errors
    /// `NotConfigured`, `InvalidName`, or `TooMany` when the class (or the
    /// global table) is exhausted.
    pub fn create<F>(&self, ctx: &ObjectsContext, name: ObjectName, init: F) -> Result<ObjectId, ObjectsError>
    where
        F: FnOnce(&mut T),
    {
        let information = self.information()?;
        if !name.is_valid() {
            return Err(ObjectsError::InvalidName);
        }

        let mut block = information.allocate().ok_or(ObjectsError::TooMany)?;
        init(&mut block.body);
        let id = block.open(ctx, name)?;

        log::debug!("[EX] {} create {} -> {}", self.class, name, id);
        Ok(id)
    }

    /// Find the id of the object named `name`
    pub fn ident(
        &self,
        ctx: &ObjectsContext,
        name: ObjectName,
        selector: NodeSelector,
    ) -> Result<ObjectId, ObjectsError> {
        self.information()?.name_to_id(ctx, name, selector)
    }

    /// Delete a local object, running `teardown` before it is freed
    ///
    /// # Errors
    /// `NotConfigured`, `InUse` if another context holds the object, or
    /// `InvalidId` unless `id` resolves locally.
    pub fn delete<F>(&self, ctx: &ObjectsContext, id: ObjectId, teardown: F) -> Result<(), ObjectsError>
    where
        F: FnOnce(&mut T),
    {
        let information = self.information()?;
        let object = match information.get(ctx, id) {
            Lookup::Local(object) => object,
            Lookup::Busy(_) => return Err(ObjectsError::InUse),
            Lookup::Remote(_) | Lookup::Error => return Err(ObjectsError::InvalidId),
        };

        let mut closed = object.close(ctx);
        teardown(&mut closed.body);
        closed.free();

        log::debug!("[EX] {} delete {}", self.class, id);
        Ok(())
    }

    /// Run `op` on the object named by `id`
    ///
    /// `op` runs with the object locked; lookups of it from `op` or from
    /// other contexts see it as busy.
    ///
    /// # Errors
    /// `NotConfigured`, `InUse` if another context holds the object, or
    /// `InvalidId` if the id resolves nowhere.
    pub fn with_object<R, F>(&self, ctx: &ObjectsContext, id: ObjectId, op: F) -> Result<Dispatch<R>, ObjectsError>
    where
        F: FnOnce(ObjectId, &mut T) -> R,
    {
        match self.information()?.get(ctx, id) {
            Lookup::Local(mut object) => {
                let id = object.id();
                Ok(Dispatch::Local(op(id, &mut object.body)))
            }
            Lookup::Remote(id) => Ok(Dispatch::Remote(id)),
            Lookup::Busy(_) => Err(ObjectsError::InUse),
            Lookup::Error => Err(ObjectsError::InvalidId),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ob::{build_id, ObjectsConfig, OBJECTS_ID_OF_SELF};

    #[derive(Debug, Default)]
    struct Semaphore {
        count: u32,
        waiters: u32,
    }

    #[derive(Debug, Default)]
    struct MessageQueue {
        pending: u32,
    }

    fn single() -> ObjectsContext {
        ObjectsContext::new(ObjectsConfig::single_node()).unwrap()
    }

    #[test]
    fn test_create_ident_delete() {
        let ctx = single();
        let sems: ClassManager<Semaphore> =
            ClassManager::new(&ctx, ObjectClass::Semaphores, InformationFlags::NAMED, 2).unwrap();
        let name = ObjectName::from(b"SEM1");

        let id = sems.create(&ctx, name, |s| s.count = 3).unwrap();
        assert_eq!(sems.ident(&ctx, name, NodeSelector::AllNodes), Ok(id));

        let count = sems.with_object(&ctx, id, |_, s| s.count).unwrap();
        assert_eq!(count, Dispatch::Local(3));

        let mut flushed = 0;
        sems.delete(&ctx, id, |s| {
            flushed = s.waiters;
            s.count = 0;
        })
        .unwrap();
        assert_eq!(flushed, 0);

        assert_eq!(sems.ident(&ctx, name, NodeSelector::AllNodes), Err(ObjectsError::NotFound));
        assert_eq!(sems.delete(&ctx, id, |_| {}), Err(ObjectsError::InvalidId));
        assert_eq!(sems.with_object(&ctx, id, |_, _| ()), Err(ObjectsError::InvalidId));
    }

    #[test]
    fn test_create_errors() {
        let ctx = single();
        let sems: ClassManager<Semaphore> =
            ClassManager::new(&ctx, ObjectClass::Semaphores, InformationFlags::NAMED, 1).unwrap();

        assert_eq!(
            sems.create(&ctx, ObjectName::NONE, |_| {}),
            Err(ObjectsError::InvalidName)
        );
        sems.create(&ctx, ObjectName::from(b"ONLY"), |_| {}).unwrap();
        assert_eq!(
            sems.create(&ctx, ObjectName::from(b"MORE"), |_| {}),
            Err(ObjectsError::TooMany)
        );
        assert_eq!(ObjectsError::TooMany.status_code(), 5);
    }

    #[test]
    fn test_unconfigured_class() {
        let ctx = single();
        let queues: ClassManager<MessageQueue> = ClassManager::unconfigured(ObjectClass::MessageQueues);
        let name = ObjectName::from(b"MSGQ");

        assert!(!queues.is_configured());
        assert_eq!(queues.create(&ctx, name, |q| q.pending = 1), Err(ObjectsError::NotConfigured));
        assert_eq!(
            queues.ident(&ctx, name, NodeSelector::LocalNode),
            Err(ObjectsError::NotConfigured)
        );
        assert_eq!(queues.delete(&ctx, build_id(1, 1), |_| {}), Err(ObjectsError::NotConfigured));
        assert_eq!(
            queues.with_object(&ctx, build_id(1, 1), |_, q| q.pending),
            Err(ObjectsError::NotConfigured)
        );
        assert_eq!(ObjectsError::NotConfigured.status_code(), 22);
    }

    #[test]
    fn test_remote_ids_are_forwarded() {
        let ctx = ObjectsContext::new(ObjectsConfig::multiprocessing(1, 3, 8)).unwrap();
        let sems: ClassManager<Semaphore> = ClassManager::new(
            &ctx,
            ObjectClass::Semaphores,
            InformationFlags::NAMED | InformationFlags::GLOBAL,
            2,
        )
        .unwrap();
        let remote = build_id(2, 1);
        sems.information()
            .unwrap()
            .mp_open(&ctx, ObjectName::from(b"REMO"), remote)
            .unwrap();

        assert_eq!(
            sems.with_object(&ctx, remote, |_, s| s.count),
            Ok(Dispatch::Remote(remote))
        );
        assert_eq!(sems.delete(&ctx, remote, |_| {}), Err(ObjectsError::InvalidId));
        assert_eq!(
            sems.ident(&ctx, ObjectName::from(b"REMO"), NodeSelector::OtherNodes),
            Ok(remote)
        );
    }

    #[test]
    fn test_self_directive() {
        let ctx = single();
        let tasks: ClassManager<Semaphore> =
            ClassManager::new(&ctx, ObjectClass::Tasks, InformationFlags::NAMED, 2).unwrap();
        let id = tasks.create(&ctx, ObjectName::from(b"TASK"), |_| {}).unwrap();
        ctx.set_executing(Some((ObjectClass::Tasks, id)));

        let me = tasks.with_object(&ctx, OBJECTS_ID_OF_SELF, |id, _| id).unwrap();
        assert_eq!(me, Dispatch::Local(id));
    }

    #[test]
    fn test_nested_directive_on_held_object() {
        let ctx = single();
        let tasks: ClassManager<Semaphore> =
            ClassManager::new(&ctx, ObjectClass::Tasks, InformationFlags::NAMED, 2).unwrap();
        let id = tasks.create(&ctx, ObjectName::from(b"TASK"), |_| {}).unwrap();
        ctx.set_executing(Some((ObjectClass::Tasks, id)));

        let outer = tasks.with_object(&ctx, id, |_, _| {
            (
                tasks.with_object(&ctx, OBJECTS_ID_OF_SELF, |_, s| s.count),
                tasks.delete(&ctx, id, |_| {}),
            )
        });
        let (inner, deleted) = match outer {
            Ok(Dispatch::Local(results)) => results,
            other => panic!("outer directive did not run locally: {:?}", other),
        };
        assert_eq!(inner, Err(ObjectsError::InUse));
        assert_eq!(deleted, Err(ObjectsError::InUse));
        assert_eq!(ObjectsError::InUse.status_code(), 12);

        // Released once the outer directive returns.
        tasks.delete(&ctx, id, |_| {}).unwrap();
    }
}
