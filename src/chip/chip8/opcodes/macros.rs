/// Defines a struct `$instruction` and a type alias `$name` for
/// `InstructionWithAddress<$instruction>`. Implements `TryFrom<Opcode>` for
/// `InstructionWithAddress<$instruction>`. The implementation of `try_from`
/// will return an error if the instruction class of the given opcode
/// does not match the instruction class given in $instruction_class, or if
/// the optional predicate `$supports` rejects the payload.
macro_rules! define_instruction_with_address {
    ($instruction:ident, $name:ident, $instruction_class:expr) => {
        define_instruction_with_address!($instruction, $name, $instruction_class, |_| true);
    };
    ($instruction:ident, $name:ident, $instruction_class:expr, $supports:expr) => {
        pub(super) struct $instruction;
        pub(super) type $name = InstructionWithAddress<$instruction>;
        impl TryFrom<Opcode> for $name {
            type Error = InstructionParsingError;

            fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
                check_opcode!(opcode, $instruction_class, $supports);
                Ok(Self {
                    instruction: PhantomData,
                    address: opcode.payload.address(),
                })
            }
        }
    };
}

/// Defines a struct `$instruction` and a type alias `$name` for
/// `InstructionWithRegAndValue<$instruction>`. Implements `TryFrom<Opcode>` for
/// `InstructionWithRegAndValue<$instruction>`. The implementation of `try_from`
/// will return an error if the instruction class of the given opcode
/// does not match the instruction class given in $instruction_class, or if
/// the optional predicate `$supports` rejects the payload.
macro_rules! define_instruction_with_reg_and_value {
    ($instruction:ident, $name:ident, $instruction_class:expr) => {
        define_instruction_with_reg_and_value!($instruction, $name, $instruction_class, |_| true);
    };
    ($instruction:ident, $name:ident, $instruction_class:expr, $supports:expr) => {
        pub(super) struct $instruction;
        pub(super) type $name = InstructionWithRegAndValue<$instruction>;
        impl TryFrom<Opcode> for $name {
            type Error = InstructionParsingError;

            fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
                check_opcode!(opcode, $instruction_class, $supports);
                let (reg, value) = opcode.payload.reg_and_value();
                Ok(Self {
                    instruction: PhantomData,
                    reg,
                    value,
                })
            }
        }
    };
}

/// Defines a struct `$instruction` and a type alias `$name` for
/// `InstructionWithOperands<$instruction>`. Implements `TryFrom<Opcode>` for
/// `InstructionWithOperands<$instruction>`. The implementation of `try_from`
/// will return an error if the instruction class of the given opcode
/// does not match the instruction class given in $instruction_class, or if
/// the optional predicate `$supports` rejects the payload.
macro_rules! define_instruction_with_operands {
    ($instruction:ident, $name:ident, $instruction_class:expr) => {
        define_instruction_with_operands!($instruction, $name, $instruction_class, |_| true);
    };
    ($instruction:ident, $name:ident, $instruction_class:expr, $supports:expr) => {
        pub(super) struct $instruction;
        pub(super) type $name = InstructionWithOperands<$instruction>;
        impl TryFrom<Opcode> for $name {
            type Error = InstructionParsingError;

            fn try_from(opcode: Opcode) -> Result<Self, Self::Error> {
                check_opcode!(opcode, $instruction_class, $supports);
                let (op1, op2, op3) = opcode.payload.operands();
                Ok(Self {
                    instruction: PhantomData,
                    op1,
                    op2,
                    op3,
                })
            }
        }
    };
}

/// Returns early with an `InstructionParsingError` if `$opcode` is not of
/// class `$instruction_class` or its payload is rejected by `$supports`.
macro_rules! check_opcode {
    ($opcode:ident, $instruction_class:expr, $supports:expr) => {
        if $opcode.instruction_class != $instruction_class {
            return Err(InstructionParsingError::InvalidInstructionClass(
                $opcode.instruction_class,
                $instruction_class,
            ));
        }
        let supports: fn(&OpcodePayload) -> bool = $supports;
        if !supports(&$opcode.payload) {
            return Err(InstructionParsingError::UnsupportedOpcode($opcode.word()));
        }
    };
}
